//! Integration tests for notemap
//!
//! End-to-end tests that crawl a real (temporary) repository tree, query the
//! resulting index, and exercise search and the thumbnail cache together.

#[cfg(test)]
mod integration_tests {
    use crate::search::{SearchEngine, SearchHit};
    use crate::thumbnail::{Thumb, ThumbDimension, ThumbnailIndex};
    use crate::*;
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn init_tracing() {
        tracing_subscriber::fmt()
            .with_env_filter("notemap=debug")
            .with_test_writer()
            .try_init()
            .ok();
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"content").unwrap();
    }

    fn route(value: &str) -> Route {
        Route::new(value).unwrap()
    }

    /// Engine fake that matches every indexed item whose route contains the
    /// query string
    struct ContainsEngine<'a> {
        index: &'a ContentIndex,
    }

    impl SearchEngine for ContainsEngine<'_> {
        fn search(&self, keywords: &str, max_results: usize) -> Vec<SearchHit> {
            self.index
                .items()
                .filter(|item| item.route().key().contains(&keywords.to_lowercase()))
                .take(max_results)
                .enumerate()
                .map(|(number, item)| SearchHit {
                    number,
                    route: item.route().clone(),
                })
                .collect()
        }
    }

    #[test]
    fn test_crawl_and_query_workflow() {
        init_tracing();
        let repo = TempDir::new().unwrap();

        // root item with a file
        touch(&repo.path().join("notes.md"));
        touch(&repo.path().join("files").join("cover.png"));
        // transparent directory with a real item below it
        touch(&repo.path().join("docs").join("guide").join("notes.md"));
        touch(
            &repo
                .path()
                .join("docs")
                .join("guide")
                .join("files")
                .join("diagram.png"),
        );
        // plain nested items
        touch(&repo.path().join("projects").join("notes.md"));
        touch(&repo.path().join("projects").join("alpha").join("notes.md"));

        let repository = Repository::open(repo.path()).unwrap();
        let index = repository.index();

        // the transparent "docs" level never became an item
        assert_eq!(index.len(), 4);
        assert!(index.is_match(&route("docs")).is_none());
        assert!(index.is_match(&route("docs/guide")).is_some());

        // root item and parents resolve
        assert!(index.root().is_some());
        let parent = index.parent(&route("projects/alpha")).unwrap();
        assert_eq!(parent.route().value(), "projects");

        // file owned by an item resolves at its exact route
        let file = index
            .is_file_match(&route("docs/guide/files/diagram.png"))
            .unwrap();
        assert!(file.path().ends_with("diagram.png"));

        // "docs" is virtual: file resolution walks through it
        assert!(index
            .is_file_match(&route("docs/guide/files/missing.png"))
            .is_none());
    }

    #[test]
    fn test_search_over_crawled_repository() {
        let repo = TempDir::new().unwrap();
        touch(&repo.path().join("projects").join("alpha").join("notes.md"));
        touch(&repo.path().join("projects").join("beta").join("notes.md"));
        touch(&repo.path().join("journal").join("notes.md"));

        let repository = Repository::open(repo.path()).unwrap();
        let engine = ContainsEngine {
            index: repository.index(),
        };
        let orchestrator = repository.search_orchestrator(&engine);

        let page = orchestrator.search("projects", 1).unwrap();
        assert_eq!(page.total_result_count, 2);
        assert_eq!(page.result_count, 2);
        assert_eq!(page.start_index, 1);
        for result in &page.results {
            assert!(result.path.starts_with("projects/"));
            assert!(result.route.starts_with("projects > "));
        }

        let empty = orchestrator.search("   ", 1).unwrap();
        assert_eq!(empty.total_result_count, 0);
    }

    #[test]
    fn test_thumbnail_index_lifecycle() {
        init_tracing();
        let repo = TempDir::new().unwrap();
        touch(&repo.path().join("notes.md"));
        touch(&repo.path().join("files").join("photo.jpg"));

        let repository = Repository::open(repo.path()).unwrap();
        let file = repository
            .index()
            .is_file_match(&route("files/photo.jpg"))
            .unwrap();

        // an external renderer would generate the variant, then record it
        let index_path = repo.path().join("metadata").join("thumbs.json");
        let hooks = ShutdownHooks::new();
        let thumbs = Arc::new(ThumbnailIndex::load(&index_path));
        thumbs.register_save_on_shutdown(&hooks);

        let dimensions = ThumbDimension::new(320, 240);
        thumbs.add_thumb(Thumb::new(
            file.route(),
            "thumbs",
            "photo-320x240.jpg",
            dimensions,
        ));

        // the synthetic thumb route decodes back to the source
        let thumb = thumbs.thumb(file.route(), &dimensions).unwrap();
        let (base, decoded) = dimensions_from_route(&thumb.thumb_route());
        assert_eq!(&base, file.route());
        assert_eq!(decoded, dimensions);

        // save at shutdown, reload on next start
        assert_eq!(hooks.run(), 0);
        let reloaded = ThumbnailIndex::load(&index_path);
        assert!(reloaded.thumb(file.route(), &dimensions).is_some());
    }

    #[test]
    fn test_reindex_after_removal_and_addition() {
        let repo = TempDir::new().unwrap();
        touch(&repo.path().join("keep").join("notes.md"));
        touch(&repo.path().join("drop").join("notes.md"));

        let mut repository = Repository::open(repo.path()).unwrap();
        assert_eq!(repository.index().len(), 2);

        // targeted removal without a re-crawl
        let removed = repository.index_mut().remove(&route("drop")).unwrap();
        assert_eq!(removed.route().value(), "drop");
        assert_eq!(repository.index().len(), 1);

        // full re-crawl picks the directory back up
        repository.reindex().unwrap();
        assert_eq!(repository.index().len(), 2);
    }
}
