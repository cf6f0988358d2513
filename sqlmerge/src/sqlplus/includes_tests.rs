//! Scenario tests for include resolution.

#[cfg(test)]
mod tests {
    use crate::errors::MergeError;
    use crate::sqlplus::loader::MockSourceLoader;
    use crate::sqlplus::{IncludeKind, IncludeResolver};
    use crate::testing::SqlTree;
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    #[test]
    fn test_file_without_directives_is_unchanged() {
        let tree = SqlTree::new().unwrap();
        let main = tree
            .file("main.sql", "-- header\r\nSELECT 1 FROM dual;\r\n\r\nSELECT 2 FROM dual;")
            .unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();

        assert_eq!(
            resolved.content,
            "-- header\nSELECT 1 FROM dual;\n\nSELECT 2 FROM dual;\n"
        );
        assert_eq!(resolved.tree.len(), 1);
        assert_eq!(resolved.tree.nodes()[0].kind, IncludeKind::Root);
    }

    #[test]
    fn test_trailing_whitespace_is_stripped() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "SELECT 1;   \t\n").unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();
        assert_eq!(resolved.content, "SELECT 1;\n");
    }

    #[test]
    fn test_nested_content_is_innermost_first() {
        let tree = SqlTree::new().unwrap();
        let a = tree.file("a.sql", "@b.sql\nMARK_A\n").unwrap();
        tree.file("b.sql", "@c.sql\nMARK_B\n").unwrap();
        tree.file("c.sql", "MARK_C\n").unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&a).unwrap();

        let c = resolved.content.find("MARK_C").unwrap();
        let b = resolved.content.find("MARK_B").unwrap();
        let a = resolved.content.find("MARK_A").unwrap();
        assert!(c < b && b < a);
        assert_eq!(resolved.content, "MARK_C\n\nMARK_B\n\nMARK_A\n");
    }

    #[test]
    fn test_anchor_semantics() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@sub/one.sql\n").unwrap();
        tree.file("sub/one.sql", "ONE\n@@two.sql\n").unwrap();
        tree.file("sub/two.sql", "TWO\n@three.sql\n").unwrap();
        tree.file("three.sql", "THREE_ROOT\n").unwrap();
        tree.file("sub/three.sql", "THREE_SUB\n").unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();

        assert!(resolved.content.contains("ONE"));
        assert!(resolved.content.contains("TWO"));
        assert!(resolved.content.contains("THREE_ROOT"));
        assert!(!resolved.content.contains("THREE_SUB"));

        let kinds: Vec<_> = resolved.tree.nodes().iter().map(|n| n.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IncludeKind::Root,
                IncludeKind::Base,
                IncludeKind::Parent,
                IncludeKind::Base
            ]
        );
        assert_eq!(resolved.tree.nodes()[2].anchor_dir, tree.path("sub"));
        assert_eq!(resolved.tree.nodes()[3].anchor_dir, tree.root());
    }

    #[test]
    fn test_tree_depths_and_rendering() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@one.sql\n@two.sql\n").unwrap();
        tree.file("one.sql", "@@nested.sql\n").unwrap();
        tree.file("nested.sql", "N\n").unwrap();
        tree.file("two.sql", "T\n").unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();

        assert_eq!(
            resolved.tree.render(),
            vec![
                "|-- main.sql",
                "    |-- one.sql",
                "        |-- nested.sql",
                "    |-- two.sql",
            ]
        );
    }

    #[test]
    fn test_directive_must_start_the_line() {
        let tree = SqlTree::new().unwrap();
        let main = tree
            .file("main.sql", "SELECT 'a@b.sql' FROM dual;\n  @indented.sql\n")
            .unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();

        assert_eq!(
            resolved.content,
            "SELECT 'a@b.sql' FROM dual;\n  @indented.sql\n"
        );
    }

    #[test]
    fn test_directive_path_is_trimmed() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@   spaced.sql   \n").unwrap();
        tree.file("spaced.sql", "OK\n").unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();
        assert_eq!(resolved.content, "OK\n\n");
    }

    #[test]
    fn test_absolute_include_path() {
        let tree = SqlTree::new().unwrap();
        let other = tree.file("elsewhere/abs.sql", "ABS\n").unwrap();
        let main = tree
            .file("main.sql", &format!("@@{}\n", other.display()))
            .unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();
        assert_eq!(resolved.content, "ABS\n\n");
    }

    #[test]
    fn test_missing_include_reports_resolved_path() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@sub/missing.sql\n").unwrap();

        let err = IncludeResolver::new(tree.root()).resolve(&main).unwrap_err();

        match err {
            MergeError::ResourceNotFound { path } => {
                assert_eq!(path, tree.root().join("sub/missing.sql"));
            }
            other => panic!("expected ResourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_include_under_relative_root_is_absolute() {
        let dir = tempfile::Builder::new().tempdir_in(".").unwrap();
        let root = PathBuf::from(dir.path().file_name().unwrap());
        std::fs::write(root.join("main.sql"), "@missing.sql\n").unwrap();

        let err = IncludeResolver::new(&root)
            .resolve(root.join("main.sql"))
            .unwrap_err();

        match err {
            MergeError::ResourceNotFound { path } => {
                assert!(path.is_absolute(), "{} is relative", path.display());
                assert!(path.ends_with(root.join("missing.sql")));
            }
            other => panic!("expected ResourceNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_same_file_twice_is_expanded_twice() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@part.sql\n@part.sql\n").unwrap();
        tree.file("part.sql", "PART\n").unwrap();

        let resolved = IncludeResolver::new(tree.root()).resolve(&main).unwrap();

        assert_eq!(resolved.content.matches("PART").count(), 2);
        assert_eq!(resolved.tree.len(), 3);
    }

    #[test]
    fn test_self_include_is_a_cycle() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@main.sql\n").unwrap();

        let err = IncludeResolver::new(tree.root()).resolve(&main).unwrap_err();
        match err {
            MergeError::IncludeCycle { chain } => assert_eq!(chain.len(), 2),
            other => panic!("expected IncludeCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_indirect_cycle() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@a.sql\n").unwrap();
        tree.file("a.sql", "@b.sql\n").unwrap();
        tree.file("b.sql", "@a.sql\n").unwrap();

        let err = IncludeResolver::new(tree.root()).resolve(&main).unwrap_err();
        match err {
            MergeError::IncludeCycle { chain } => {
                let names: Vec<_> = chain
                    .iter()
                    .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                    .collect();
                assert_eq!(names, vec!["a.sql", "b.sql", "a.sql"]);
            }
            other => panic!("expected IncludeCycle, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let tree = SqlTree::new().unwrap();
        let main = tree.file("main.sql", "@l1.sql\n").unwrap();
        tree.file("l1.sql", "@l2.sql\n").unwrap();
        tree.file("l2.sql", "@l3.sql\n").unwrap();
        tree.file("l3.sql", "DEEP\n").unwrap();

        let resolver = IncludeResolver::new(tree.root()).with_max_depth(2);
        let err = resolver.resolve(&main).unwrap_err();
        assert!(matches!(
            err,
            MergeError::IncludeDepthExceeded { max_depth: 2, .. }
        ));

        let resolver = IncludeResolver::new(tree.root()).with_max_depth(3);
        assert!(resolver.resolve(&main).unwrap().content.contains("DEEP"));
    }

    #[test]
    fn test_custom_loader_reads_each_include() {
        let mut loader = MockSourceLoader::new();
        loader
            .expect_read_source()
            .withf(|p: &Path| p == Path::new("main.sql"))
            .times(1)
            .returning(|_| Ok("@part.sql\n@part.sql\n".to_string()));
        loader
            .expect_read_source()
            .withf(|p: &Path| p == Path::new("/root/part.sql"))
            .times(2)
            .returning(|_| Ok("PART\n".to_string()));
        loader
            .expect_identity()
            .returning(|p: &Path| p.to_path_buf());

        let resolver = IncludeResolver::with_loader("/root", loader);
        let resolved = resolver.resolve("main.sql").unwrap();

        assert_eq!(resolved.content, "PART\n\nPART\n\n");
        assert_eq!(resolved.tree.nodes()[1].path, PathBuf::from("/root/part.sql"));
    }
}
