//! End-to-end tests: config file -> registry -> pipeline -> merged script.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;

use serde_json::json;
use sqlmerge::prelude::*;
use sqlmerge::testing::SqlTree;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Writes an `MKFSource.toml` into the tree whose input points at `main.sql`.
fn write_config(tree: &SqlTree, body: &str) -> std::path::PathBuf {
    let input = toml_path(&tree.path("main.sql"));
    let output = toml_path(&tree.path("out/merged.sql"));
    let text = format!("[project]\ninput = {input}\noutput = {output}\n{body}");
    tree.file("MKFSource.toml", &text).expect("config written")
}

fn toml_path(path: &Path) -> String {
    format!("{:?}", path.display().to_string())
}

/// Loads the config and runs the configured pipeline over its input.
fn run(config_path: &Path) -> Result<ProcessingContext> {
    let config = MergeConfig::load(config_path)?;
    let registry = StageFactory::with_builtins().build_registry(&config)?;
    let pipeline = Pipeline::new(registry, config.execution_order().to_vec());

    let ctx = ProcessingContext::from_file(&config.project.input)?
        .with_variables(config.load_variables())
        .with_verbose(config.project.verbose);
    pipeline.execute(ctx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn full_pipeline_merges_includes_variables_and_template() {
    let tree = SqlTree::new().unwrap();
    tree.file(
        "main.sql",
        "-- deploy script\nDEFINE schema='HR'\n@ddl/tables.sql\n{{#each grants}}GRANT SELECT ON &schema..{{this}} TO {{sql_escape @root.role}};\n{{/each}}",
    )
    .unwrap();
    tree.file("ddl/tables.sql", "@@emp.sql\n@@dept.sql\n").unwrap();
    tree.file("ddl/emp.sql", "CREATE TABLE &schema..emp (id NUMBER);\n").unwrap();
    tree.file("ddl/dept.sql", "CREATE TABLE &schema..dept (id NUMBER);\n").unwrap();
    let vars = tree
        .file("vars.json", r#"{"grants": ["emp", "dept"], "role": "app_ro"}"#)
        .unwrap();

    let config = write_config(
        &tree,
        &format!(
            "verbose = true\nexecution_order = [\"sqlplus_includes\", \"sqlplus_vars\", \"template\"]\n\n[plugins.template]\nvariables_file = {}\n",
            toml_path(&vars)
        ),
    );

    let out = run(&config).expect("pipeline succeeds");

    assert_eq!(
        out.content,
        "-- deploy script\n\
         CREATE TABLE HR.emp (id NUMBER);\n\
         \n\
         CREATE TABLE HR.dept (id NUMBER);\n\
         \n\
         \n\
         GRANT SELECT ON HR.emp TO app_ro;\n\
         GRANT SELECT ON HR.dept TO app_ro;\n"
    );
    assert_eq!(out.variable("sql_schema"), Some(&json!("HR")));
    assert_eq!(
        out.metadata("include_tree").and_then(|v| v.as_array()).map(Vec::len),
        Some(4)
    );
}

#[test]
fn legacy_pipeline_section_and_disabled_stage() {
    let tree = SqlTree::new().unwrap();
    tree.file("main.sql", "DEFINE x='1'\nSELECT &x, '{{kept}}' FROM dual;\n").unwrap();
    let config = write_config(
        &tree,
        "\n[pipeline]\nexecution_order = [\"sqlplus_vars\", \"template\"]\n\n[plugins.template]\nenabled = false\n",
    );

    let out = run(&config).unwrap();

    assert_eq!(out.content, "SELECT 1, '{{kept}}' FROM dual;");
    let report = out.metadata("pipeline.stages").unwrap();
    assert_eq!(report[1]["reason"], json!("disabled"));
}

#[test]
fn unknown_stage_in_order_is_tolerated() {
    let tree = SqlTree::new().unwrap();
    tree.file("main.sql", "DEFINE t=dual\nSELECT 1 FROM &t;\n").unwrap();
    let config = write_config(
        &tree,
        "execution_order = [\"sqlplus_vars\", \"jinja2\"]\n",
    );

    let out = run(&config).unwrap();
    assert_eq!(out.content, "SELECT 1 FROM dual;");
}

#[test]
fn include_cycle_fails_with_stage_name() {
    let tree = SqlTree::new().unwrap();
    tree.file("main.sql", "@a.sql\n").unwrap();
    tree.file("a.sql", "@main.sql\n").unwrap();
    let config = write_config(&tree, "execution_order = [\"sqlplus_includes\"]\n");

    let err = run(&config).unwrap_err();

    assert_eq!(err.code(), "INCLUDE-CYCLE");
    assert!(err.to_string().contains("sqlplus_includes"));
    assert!(err.fix_hint().is_some());
}

#[test]
fn missing_include_reports_resolved_path() {
    let tree = SqlTree::new().unwrap();
    tree.file("main.sql", "@@nowhere/file.sql\n").unwrap();
    let config = write_config(&tree, "execution_order = [\"sqlplus_includes\"]\n");

    let err = run(&config).unwrap_err();

    assert_eq!(err.code(), "INCLUDE-NOT-FOUND");
    assert!(err.to_string().contains("file.sql"));
}

#[test]
fn host_stage_registered_through_factory() {
    fn trim_blank_lines(settings: &StageSettings) -> Result<Box<dyn Stage>> {
        let stage = FnStage::new("trim_blank_lines", |mut ctx: ProcessingContext| {
            let kept: Vec<&str> = ctx.content.lines().filter(|l| !l.trim().is_empty()).collect();
            ctx.content = kept.join("\n");
            Ok(ctx)
        })
        .with_enabled(settings.is_enabled());
        Ok(Box::new(stage))
    }

    let tree = SqlTree::new().unwrap();
    tree.file("main.sql", "@@a.sql\n@@b.sql\n").unwrap();
    tree.file("a.sql", "A;\n").unwrap();
    tree.file("b.sql", "B;\n").unwrap();
    let config_path = write_config(
        &tree,
        "execution_order = [\"sqlplus_includes\", \"trim_blank_lines\"]\n\n[plugins.trim_blank_lines]\nenabled = true\n",
    );

    let config = MergeConfig::load(&config_path).unwrap();
    let mut factory = StageFactory::with_builtins();
    factory.register("trim_blank_lines", trim_blank_lines);
    let pipeline = Pipeline::new(
        factory.build_registry(&config).unwrap(),
        config.execution_order().to_vec(),
    );

    let out = pipeline
        .execute(ProcessingContext::from_file(&config.project.input).unwrap())
        .unwrap();
    assert_eq!(out.content, "A;\nB;");
}
