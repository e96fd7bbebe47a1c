//! Recursive folder traversal with bounded concurrency and a deadline
//!
//! One walk invocation owns all of its state (options, start instant,
//! truncation flag), so concurrent enumerations for different requests never
//! interfere. The deadline is cooperative: elapsed time is checked after
//! every listing page and before every subfolder batch, and in-flight calls
//! are allowed to finish once started.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures_util::future::{join_all, BoxFuture, FutureExt};
use log::{debug, warn};

use crate::classify::{classify, FileKind, FOLDER_MIME_TYPE};
use crate::client::{ClientError, ListingClient};
use crate::error::WalkError;
use crate::types::{FileEntry, WalkOptions, WalkResult};

struct WalkContext<'a, C> {
    client: &'a C,
    options: WalkOptions,
    started: Instant,
    truncated: AtomicBool,
}

impl<'a, C: ListingClient> WalkContext<'a, C> {
    fn over_budget(&self) -> bool {
        self.started.elapsed() >= self.options.budget
    }

    fn mark_truncated(&self) {
        self.truncated.store(true, Ordering::SeqCst);
    }
}

/// Enumerate every video/PDF transitively contained in `root_folder_id`.
///
/// Failures below the root are absorbed per branch: an inaccessible
/// subfolder contributes zero entries and is logged, but never aborts its
/// siblings or the walk. Failures listing the root itself propagate as
/// `AuthRequired` or `Fatal`. A blown budget returns
/// `WalkError::DeadlineExceeded` carrying the partial result.
pub async fn enumerate<C>(
    client: &C,
    root_folder_id: &str,
    options: WalkOptions,
) -> Result<WalkResult, WalkError>
where
    C: ListingClient,
{
    let folder_id = root_folder_id.trim();
    if folder_id.is_empty() {
        return Err(WalkError::InvalidFolderId(root_folder_id.to_string()));
    }

    let ctx = WalkContext {
        client,
        options,
        started: Instant::now(),
        truncated: AtomicBool::new(false),
    };

    let entries = match walk_folder(&ctx, folder_id.to_string(), String::new(), 0).await {
        Ok(entries) => entries,
        Err(ClientError::AuthRequired) => return Err(WalkError::AuthRequired),
        Err(err) => return Err(WalkError::Fatal(err.to_string())),
    };

    let result = WalkResult {
        entries,
        elapsed_millis: ctx.started.elapsed().as_millis() as u64,
        truncated: ctx.truncated.load(Ordering::SeqCst),
    };

    if result.truncated {
        return Err(WalkError::DeadlineExceeded { partial: result });
    }
    Ok(result)
}

/// Walk one folder: page through its children, emit classified files, then
/// descend into subfolders in fixed-size concurrent batches.
///
/// Listing errors bubble up to the caller; recursion sites absorb them so a
/// failure stays scoped to its own subtree.
fn walk_folder<'a, C>(
    ctx: &'a WalkContext<'a, C>,
    folder_id: String,
    parent_path: String,
    depth: usize,
) -> BoxFuture<'a, Result<Vec<FileEntry>, ClientError>>
where
    C: ListingClient,
{
    async move {
        let mut entries: Vec<FileEntry> = Vec::new();

        // Guards against malformed/cyclic trees
        if depth > ctx.options.max_depth {
            warn!(
                "max depth {} reached under {:?}, skipping deeper folders",
                ctx.options.max_depth, parent_path
            );
            return Ok(entries);
        }

        // A failed name lookup never halts traversal
        let folder_name = match ctx.client.folder_name(&folder_id).await {
            Ok(name) => name,
            Err(err) => {
                debug!("name lookup failed for folder {}: {}", folder_id, err);
                format!("Folder_{}", folder_id)
            }
        };
        let current_path = if parent_path.is_empty() {
            folder_name
        } else {
            format!("{}/{}", parent_path, folder_name)
        };

        debug!("exploring folder {:?} ({})", current_path, folder_id);

        // Collect this folder's files and queue subfolders for descent
        let mut subfolders: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = ctx
                .client
                .list_children(&folder_id, ctx.options.page_size, page_token.as_deref())
                .await?;

            for item in page.items {
                if item.mime_type == FOLDER_MIME_TYPE {
                    subfolders.push(item.id);
                    continue;
                }
                match classify(&item.mime_type) {
                    // "Other" files are dropped, not surfaced
                    FileKind::Other => {}
                    kind => entries.push(FileEntry {
                        id: item.id,
                        name: item.name,
                        kind,
                        mime_type: item.mime_type,
                        size_bytes: item.size.unwrap_or(0),
                        folder_path: current_path.clone(),
                        view_link: item.view_link,
                    }),
                }
            }

            if ctx.over_budget() {
                ctx.mark_truncated();
                return Ok(entries);
            }

            page_token = match page.next_page_token {
                Some(token) => Some(token),
                None => break,
            };
        }

        // Descend in batches so at most batch_size listings are in flight
        for batch in subfolders.chunks(ctx.options.batch_size.max(1)) {
            if ctx.over_budget() {
                ctx.mark_truncated();
                break;
            }

            let walks = batch.iter().map(|sub_id| {
                let sub_id = sub_id.clone();
                let sub_path = current_path.clone();
                async move {
                    match walk_folder(ctx, sub_id.clone(), sub_path, depth + 1).await {
                        Ok(found) => found,
                        Err(err) => {
                            warn!("skipping inaccessible folder {}: {}", sub_id, err);
                            Vec::new()
                        }
                    }
                }
            });

            for found in join_all(walks).await {
                entries.extend(found);
            }
        }

        Ok(entries)
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::client::{ChildPage, RemoteItem};
    use crate::types::WalkSummary;

    const FAST_BUDGET: Duration = Duration::from_secs(30);

    struct FakeFolder {
        name: &'static str,
        children: Vec<RemoteItem>,
    }

    /// In-memory folder tree speaking the ListingClient contract, with
    /// switchable per-folder failures and per-call latency.
    #[derive(Default)]
    struct FakeDrive {
        folders: HashMap<String, FakeFolder>,
        failing_listings: HashSet<String>,
        failing_names: HashSet<String>,
        list_calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        latency: Option<Duration>,
    }

    impl FakeDrive {
        fn folder(&mut self, id: &str, name: &'static str) -> &mut Self {
            self.folders.insert(
                id.to_string(),
                FakeFolder {
                    name,
                    children: Vec::new(),
                },
            );
            self
        }

        fn file(&mut self, parent: &str, id: &str, name: &str, mime: &str, size: Option<u64>) {
            self.folders
                .get_mut(parent)
                .expect("parent folder registered")
                .children
                .push(RemoteItem {
                    id: id.to_string(),
                    name: name.to_string(),
                    mime_type: mime.to_string(),
                    size,
                    view_link: None,
                });
        }

        fn subfolder(&mut self, parent: &str, id: &str, name: &'static str) {
            self.folders
                .get_mut(parent)
                .expect("parent folder registered")
                .children
                .push(RemoteItem {
                    id: id.to_string(),
                    name: name.to_string(),
                    mime_type: FOLDER_MIME_TYPE.to_string(),
                    size: None,
                    view_link: None,
                });
            self.folder(id, name);
        }
    }

    #[async_trait]
    impl ListingClient for FakeDrive {
        async fn list_children(
            &self,
            folder_id: &str,
            page_size: u32,
            page_token: Option<&str>,
        ) -> Result<ChildPage, ClientError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            let result = (|| {
                if self.failing_listings.contains(folder_id) {
                    return Err(ClientError::PermissionDenied("listing denied".to_string()));
                }
                let folder = self
                    .folders
                    .get(folder_id)
                    .ok_or_else(|| ClientError::NotFound(folder_id.to_string()))?;

                let offset: usize = page_token.map(|t| t.parse().unwrap()).unwrap_or(0);
                let end = (offset + page_size as usize).min(folder.children.len());
                let items = folder.children[offset..end].to_vec();
                let next_page_token = if end < folder.children.len() {
                    Some(end.to_string())
                } else {
                    None
                };
                Ok(ChildPage {
                    items,
                    next_page_token,
                })
            })();

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }

        async fn folder_name(&self, folder_id: &str) -> Result<String, ClientError> {
            if self.failing_names.contains(folder_id) {
                return Err(ClientError::Transport("metadata lookup failed".to_string()));
            }
            self.folders
                .get(folder_id)
                .map(|f| f.name.to_string())
                .ok_or_else(|| ClientError::NotFound(folder_id.to_string()))
        }
    }

    fn options(budget: Duration) -> WalkOptions {
        WalkOptions {
            budget,
            ..WalkOptions::default()
        }
    }

    #[tokio::test]
    async fn root_videos_and_nested_pdf_get_exact_paths() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        drive.file("root", "v1", "a.mp4", "video/mp4", Some(100));
        drive.file("root", "v2", "b.mkv", "video/x-matroska", Some(50));
        drive.file("root", "skip", "notes.txt", "text/plain", Some(1));
        drive.subfolder("root", "clips", "Clips");
        drive.file("clips", "p1", "doc.pdf", "application/pdf", Some(7));

        let result = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();

        assert!(!result.truncated);
        assert_eq!(result.entries.len(), 3);
        let by_id: HashMap<&str, &FileEntry> =
            result.entries.iter().map(|e| (e.id.as_str(), e)).collect();
        assert_eq!(by_id["v1"].folder_path, "Root");
        assert_eq!(by_id["v1"].kind, FileKind::Video);
        assert_eq!(by_id["v2"].folder_path, "Root");
        assert_eq!(by_id["p1"].folder_path, "Root/Clips");
        assert_eq!(by_id["p1"].kind, FileKind::Pdf);

        let summary = WalkSummary::of(&result.entries);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.videos, 2);
        assert_eq!(summary.pdfs, 1);
        assert_eq!(summary.folders, 2);
        assert_eq!(summary.total_bytes, 157);
    }

    #[tokio::test]
    async fn pagination_accounts_for_every_child_exactly_once() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        for i in 0..250 {
            drive.file("root", &format!("f{i}"), &format!("clip{i}.mp4"), "video/mp4", Some(1));
        }

        let result = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();

        assert_eq!(result.entries.len(), 250);
        let unique: HashSet<&str> = result.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(unique.len(), 250);
        // 250 children at 100 per page is exactly 3 listing calls
        assert_eq!(drive.list_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn missing_size_defaults_to_zero() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        drive.file("root", "v1", "a.mp4", "video/mp4", None);

        let result = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();
        assert_eq!(result.entries[0].size_bytes, 0);
    }

    #[tokio::test]
    async fn branches_past_the_depth_ceiling_contribute_nothing() {
        let mut drive = FakeDrive::default();
        drive.folder("d0", "L0");
        drive.subfolder("d0", "d1", "L1");
        drive.subfolder("d1", "d2", "L2");
        drive.subfolder("d2", "d3", "L3");
        drive.file("d1", "ok", "ok.mp4", "video/mp4", Some(1));
        drive.file("d3", "deep", "deep.mp4", "video/mp4", Some(1));

        let opts = WalkOptions {
            max_depth: 2,
            ..options(FAST_BUDGET)
        };
        let result = enumerate(&drive, "d0", opts).await.unwrap();

        let ids: Vec<&str> = result.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn failing_subfolder_does_not_doom_siblings() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        drive.file("root", "v0", "top.mp4", "video/mp4", Some(1));
        drive.subfolder("root", "locked", "Locked");
        drive.subfolder("root", "open", "Open");
        drive.file("locked", "hidden", "hidden.mp4", "video/mp4", Some(1));
        drive.file("open", "v1", "ok.mp4", "video/mp4", Some(1));
        drive.failing_listings.insert("locked".to_string());

        let result = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();

        let ids: HashSet<&str> = result.entries.iter().map(|e| e.id.as_str()).collect();
        assert!(ids.contains("v0"));
        assert!(ids.contains("v1"));
        assert!(!ids.contains("hidden"));
    }

    #[tokio::test]
    async fn failed_name_lookup_substitutes_placeholder() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        drive.subfolder("root", "anon", "ignored");
        drive.file("anon", "v1", "a.mp4", "video/mp4", Some(1));
        drive.failing_names.insert("anon".to_string());

        let result = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();

        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].folder_path, "Root/Folder_anon");
    }

    #[tokio::test]
    async fn blown_budget_returns_truncated_partial() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        drive.file("root", "v1", "a.mp4", "video/mp4", Some(1));
        drive.subfolder("root", "never", "Never");
        drive.file("never", "unreached", "b.mp4", "video/mp4", Some(1));
        drive.latency = Some(Duration::from_millis(20));

        let err = enumerate(&drive, "root", options(Duration::from_millis(5)))
            .await
            .unwrap_err();

        match err {
            WalkError::DeadlineExceeded { partial } => {
                assert!(partial.truncated);
                // The root page finished; the subfolder was never entered
                let ids: Vec<&str> = partial.entries.iter().map(|e| e.id.as_str()).collect();
                assert_eq!(ids, vec!["v1"]);
            }
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn enumeration_is_idempotent_over_an_unchanged_tree() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        drive.subfolder("root", "a", "A");
        drive.subfolder("root", "b", "B");
        drive.file("a", "f1", "1.mp4", "video/mp4", Some(10));
        drive.file("b", "f2", "2.pdf", "application/pdf", Some(20));
        drive.file("root", "f3", "3.mp4", "video/webm", Some(30));

        let first = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();
        let second = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();

        let key = |r: &WalkResult| -> Vec<(String, String)> {
            let mut pairs: Vec<(String, String)> = r
                .entries
                .iter()
                .map(|e| (e.id.clone(), e.folder_path.clone()))
                .collect();
            pairs.sort();
            pairs
        };
        assert_eq!(key(&first), key(&second));
    }

    #[tokio::test]
    async fn blank_root_id_is_rejected_up_front() {
        let drive = FakeDrive::default();
        let err = enumerate(&drive, "  ", options(FAST_BUDGET)).await.unwrap_err();
        assert!(matches!(err, WalkError::InvalidFolderId(_)));
        assert_eq!(drive.list_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn at_most_batch_size_listings_run_concurrently() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        for i in 0..12 {
            let id = format!("sub{i}");
            drive.subfolder("root", &id, "Sub");
            drive.file(&id, &format!("v{i}"), "clip.mp4", "video/mp4", Some(1));
        }
        drive.latency = Some(Duration::from_millis(10));

        let result = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap();

        assert_eq!(result.entries.len(), 12);
        // The root listing runs alone; subfolder listings are batched
        assert!(drive.max_in_flight.load(Ordering::SeqCst) <= 5);
    }

    struct ExpiredToken;

    #[async_trait]
    impl ListingClient for ExpiredToken {
        async fn list_children(
            &self,
            _folder_id: &str,
            _page_size: u32,
            _page_token: Option<&str>,
        ) -> Result<ChildPage, ClientError> {
            Err(ClientError::AuthRequired)
        }

        async fn folder_name(&self, _folder_id: &str) -> Result<String, ClientError> {
            Err(ClientError::AuthRequired)
        }
    }

    #[tokio::test]
    async fn auth_failure_at_the_root_propagates_as_auth_required() {
        let err = enumerate(&ExpiredToken, "root", options(FAST_BUDGET))
            .await
            .unwrap_err();
        assert!(matches!(err, WalkError::AuthRequired));
    }

    #[tokio::test]
    async fn root_listing_failure_is_fatal() {
        let mut drive = FakeDrive::default();
        drive.folder("root", "Root");
        drive.failing_listings.insert("root".to_string());

        let err = enumerate(&drive, "root", options(FAST_BUDGET)).await.unwrap_err();
        assert!(matches!(err, WalkError::Fatal(_)));
    }

    #[tokio::test]
    async fn unknown_root_folder_is_fatal_not_empty() {
        let drive = FakeDrive::default();
        let err = enumerate(&drive, "nope", options(FAST_BUDGET)).await.unwrap_err();
        assert!(matches!(err, WalkError::Fatal(_)));
    }
}
