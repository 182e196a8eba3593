use jsl_common::ScriptMetadata;
use jsl_lint::runners::beautifier::Beautifier;
use jsl_lint::runners::eslint::ESLint;
use jsl_lint::runners::{Invocation, ProcessRunner, RunnerOutput};
use jsl_lint::{
    ChannelSink, LintContext, LintError, LintJob, LintStatus, LintTask, ResultSink, ResultTable,
    WorkerPool,
};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const BEAUTIFIER: &str = "/tools/js-beautify";
const ESLINT: &str = "/tools/eslint";

type Handler = Box<dyn Fn(&Invocation) -> RunnerOutput + Send + Sync>;

/// Fake tools keyed by program path. Unknown programs fail to launch.
#[derive(Default)]
struct ScriptedRunner {
    handlers: HashMap<PathBuf, Handler>,
    calls: Mutex<Vec<Invocation>>,
}

impl ScriptedRunner {
    fn with(
        mut self,
        program: &str,
        handler: impl Fn(&Invocation) -> RunnerOutput + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(PathBuf::from(program), Box::new(handler));
        self
    }

    fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<RunnerOutput, LintError> {
        self.calls.lock().unwrap().push(invocation.clone());
        match self.handlers.get(&invocation.program) {
            Some(handler) => Ok(handler(invocation)),
            None => Err(LintError::Launch {
                tool: invocation.tool.clone(),
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file or directory"),
            }),
        }
    }
}

fn exit(code: i32, stdout: &str, stderr: &str) -> RunnerOutput {
    RunnerOutput {
        exit_code: code,
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    storage: PathBuf,
    output: PathBuf,
    table: Arc<ResultTable>,
    runner: Arc<ScriptedRunner>,
    ctx: Arc<LintContext>,
}

fn fixture(runner: ScriptedRunner, eslint_bin: &str) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("js");
    let output = dir.path().join("out");
    let table = Arc::new(ResultTable::new());
    let runner = Arc::new(runner);
    let ctx = Arc::new(LintContext {
        runner: runner.clone(),
        beautifier: Beautifier::new(PathBuf::from(BEAUTIFIER)),
        eslint: ESLint::new(PathBuf::from(eslint_bin), PathBuf::from("/etc/jsl/eslintrc.json")),
        output_dir: output.clone(),
        sink: table.clone(),
    });
    Fixture {
        _dir: dir,
        storage,
        output,
        table,
        runner,
        ctx,
    }
}

fn job(f: &Fixture, url: &str, script: &str) -> LintJob {
    LintJob::new(script, ScriptMetadata::new("example.com", url), f.storage.clone())
}

fn header(url: &str) -> String {
    ScriptMetadata::new("example.com", url).comment_header()
}

#[tokio::test]
async fn test_clean_run_counts_findings() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |_| exit(0, "", ""))
        .with(ESLINT, |_| exit(0, "no problems\n\n\n", ""));
    let f = fixture(runner, ESLINT);
    let url = "https://example.com/a.js";

    let result = LintTask::new(f.ctx.clone(), job(&f, url, "var x=1")).run().await;

    assert_eq!(result.host, "example.com");
    assert_eq!(result.url, url);
    assert_eq!(result.status, LintStatus::Clean);
    assert_eq!(result.status.to_string(), "Beautified");
    assert_eq!(result.finding_count, 1);
    assert_eq!(f.table.snapshot(), vec![result]);

    let meta = ScriptMetadata::new("example.com", url);
    let script = fs::read_to_string(f.storage.join(meta.storage_file_name())).unwrap();
    assert_eq!(script, format!("{}var x=1", header(url)));
    let results = fs::read_to_string(f.output.join(meta.results_file_name())).unwrap();
    assert_eq!(results, format!("{}no problems\n\n\n", header(url)));
}

#[tokio::test]
async fn test_tools_run_in_order_on_stored_file() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |inv| {
            // The file carries the provenance header before formatting starts.
            let content = fs::read_to_string(&inv.args[1]).unwrap();
            assert!(content.starts_with("/*\n * Host: example.com\n"));
            exit(0, "", "")
        })
        .with(ESLINT, |_| exit(1, "A\n\n\nB\n\n\nC\n\n\n", ""));
    let f = fixture(runner, ESLINT);

    let result = LintTask::new(f.ctx.clone(), job(&f, "https://example.com/b.js", "f()"))
        .run()
        .await;

    // Findings do not affect pipeline health.
    assert!(result.status.is_clean());
    assert_eq!(result.finding_count, 3);

    let calls = f.runner.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].program, PathBuf::from(BEAUTIFIER));
    assert_eq!(calls[0].args[0], "-f");
    assert_eq!(calls[0].args[2], "-r");
    assert_eq!(calls[0].working_dir, PathBuf::from("/tools"));
    assert_eq!(calls[1].program, PathBuf::from(ESLINT));
    assert_eq!(calls[0].args[1], calls[1].args[6]);
    assert!(calls[1].args.contains(&"--no-inline-config".to_string()));
}

#[tokio::test]
async fn test_missing_linter_is_error() {
    let runner = ScriptedRunner::default().with(BEAUTIFIER, |_| exit(0, "", ""));
    let f = fixture(runner, "/nowhere/eslint");
    let url = "https://example.com/a.js";

    let result = LintTask::new(f.ctx.clone(), job(&f, url, "var x=1")).run().await;

    assert!(result.status.is_error());
    assert!(
        result.status.to_string().starts_with("Failed to launch 'eslint'"),
        "{}",
        result.status
    );
    assert_eq!(result.finding_count, 0);
    assert_eq!(f.table.len(), 1);

    let meta = ScriptMetadata::new("example.com", url);
    assert!(!f.output.join(meta.results_file_name()).exists());
}

#[tokio::test]
async fn test_parse_error_exit_is_not_fatal() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |_| exit(0, "", ""))
        .with(ESLINT, |_| exit(2, "", "Unexpected token\n"));
    let f = fixture(runner, ESLINT);
    let url = "https://example.com/broken.js";

    let result = LintTask::new(f.ctx.clone(), job(&f, url, "var = ;")).run().await;

    assert!(!result.status.is_error());
    assert_eq!(result.status, LintStatus::Warning("Unexpected token".into()));
    assert!(result.status.to_string().contains("Unexpected token"));
    assert_eq!(result.finding_count, 0);

    let meta = ScriptMetadata::new("example.com", url);
    let results = fs::read_to_string(f.output.join(meta.results_file_name())).unwrap();
    assert_eq!(results, header(url));
}

#[tokio::test]
async fn test_parse_error_still_counts_stdout() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |_| exit(0, "", ""))
        .with(ESLINT, |_| exit(2, "Parsing error\n\n\n", "Unexpected token"));
    let f = fixture(runner, ESLINT);

    let result = LintTask::new(f.ctx.clone(), job(&f, "https://example.com/c.js", "x"))
        .run()
        .await;

    assert_eq!(result.finding_count, 1);
    assert!(matches!(result.status, LintStatus::Warning(_)));
}

#[tokio::test]
async fn test_beautifier_failure_still_lints() {
    let runner = ScriptedRunner::default().with(ESLINT, |_| exit(1, "A\n\n\nB\n\n\n", "eslint noise"));
    let f = fixture(runner, ESLINT);

    let result = LintTask::new(f.ctx.clone(), job(&f, "https://example.com/d.js", "x"))
        .run()
        .await;

    assert_eq!(f.runner.calls().len(), 2);
    assert_eq!(result.finding_count, 2);
    let LintStatus::Error(detail) = &result.status else {
        panic!("expected error status, got {:?}", result.status);
    };
    assert!(detail.starts_with("Failed to launch 'js-beautify'"));
    assert!(detail.ends_with("eslint noise"));
}

#[tokio::test]
async fn test_beautifier_nonzero_exit_is_warning() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |_| exit(1, "", "cannot beautify"))
        .with(ESLINT, |_| exit(0, "", ""));
    let f = fixture(runner, ESLINT);

    let result = LintTask::new(f.ctx.clone(), job(&f, "https://example.com/e.js", "x"))
        .run()
        .await;

    assert_eq!(
        result.status,
        LintStatus::Warning("js-beautify exited with code 1: cannot beautify".into())
    );
}

#[tokio::test]
async fn test_write_failure_publishes_once() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |_| exit(0, "", ""))
        .with(ESLINT, |_| exit(0, "", ""));
    let f = fixture(runner, ESLINT);
    // A regular file where the storage directory should be.
    fs::write(&f.storage, "not a directory").unwrap();

    let result = LintTask::new(f.ctx.clone(), job(&f, "https://example.com/a.js", "x"))
        .run()
        .await;

    assert!(result.status.to_string().starts_with("Failed to create directory"));
    assert_eq!(result.finding_count, 0);
    assert!(f.runner.calls().is_empty());
    assert_eq!(f.table.len(), 1);
}

#[tokio::test]
async fn test_results_write_failure_keeps_count() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |_| exit(0, "", ""))
        .with(ESLINT, |_| exit(1, "A\n\n\n", ""));
    let f = fixture(runner, ESLINT);
    fs::write(&f.output, "not a directory").unwrap();

    let result = LintTask::new(f.ctx.clone(), job(&f, "https://example.com/a.js", "x"))
        .run()
        .await;

    assert!(result.status.is_error());
    assert_eq!(result.finding_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_tasks_each_publish_once() {
    let runner = ScriptedRunner::default()
        .with(BEAUTIFIER, |_| exit(0, "", ""))
        .with(ESLINT, |_| exit(1, "finding\n\n\n", ""));
    let f = fixture(runner, ESLINT);

    let mut pool = WorkerPool::new(f.ctx.clone(), Some(8));
    for i in 0..50 {
        pool.submit(job(&f, &format!("https://example.com/{i}.js"), "var x=1"));
    }
    assert_eq!(pool.join_all().await, 50);
    assert_eq!(pool.pending(), 0);

    let rows = f.table.snapshot();
    assert_eq!(rows.len(), 50);
    let urls: HashSet<_> = rows.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls.len(), 50);
    for row in &rows {
        assert_eq!(row.host, "example.com");
        assert!(row.status.is_clean());
        assert_eq!(row.finding_count, 1);
    }
}

#[tokio::test]
async fn test_unbounded_pool_with_channel_sink() {
    let runner = Arc::new(
        ScriptedRunner::default()
            .with(BEAUTIFIER, |_| exit(0, "", ""))
            .with(ESLINT, |_| exit(0, "", "")),
    );
    let dir = tempfile::tempdir().unwrap();
    let (sink, mut rx) = ChannelSink::new();
    let ctx = Arc::new(LintContext {
        runner,
        beautifier: Beautifier::new(PathBuf::from(BEAUTIFIER)),
        eslint: ESLint::new(PathBuf::from(ESLINT), PathBuf::from("rc.json")),
        output_dir: dir.path().join("out"),
        sink: Arc::new(sink),
    });

    let mut pool = WorkerPool::new(ctx, None);
    for i in 0..5 {
        pool.submit(LintJob::new(
            "x",
            ScriptMetadata::new("example.com", format!("https://example.com/{i}.js")),
            dir.path().join("js"),
        ));
    }
    pool.join_all().await;

    let mut received = 0;
    while let Ok(result) = rx.try_recv() {
        assert!(result.status.is_clean());
        received += 1;
    }
    assert_eq!(received, 5);
}

/// Every tool call takes a while, so tasks are still running or queued when
/// the pool goes away.
struct SlowRunner;

#[async_trait::async_trait]
impl ProcessRunner for SlowRunner {
    async fn run(&self, _invocation: &Invocation) -> Result<RunnerOutput, LintError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(exit(0, "", ""))
    }
}

#[tokio::test]
async fn test_dropped_pool_publishes_running_and_queued_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let table = Arc::new(ResultTable::new());
    let ctx = Arc::new(LintContext {
        runner: Arc::new(SlowRunner),
        beautifier: Beautifier::new(PathBuf::from(BEAUTIFIER)),
        eslint: ESLint::new(PathBuf::from(ESLINT), PathBuf::from("rc.json")),
        output_dir: dir.path().join("out"),
        sink: table.clone(),
    });

    let mut pool = WorkerPool::new(ctx, Some(1));
    for i in 0..3 {
        pool.submit(LintJob::new(
            "var x=1",
            ScriptMetadata::new("h", format!("https://h/{i}.js")),
            dir.path().join("js"),
        ));
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(pool);

    // Aborted tasks are dropped the next time the runtime gets to them.
    for _ in 0..50 {
        if table.len() == 3 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let rows = table.snapshot();
    assert_eq!(rows.len(), 3);
    let urls: HashSet<_> = rows.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls.len(), 3);
    for row in &rows {
        assert_eq!(
            row.status,
            LintStatus::Error("Task aborted before completion".into())
        );
    }
}

#[test]
fn test_sink_trait_object_accepts_table_reference() {
    let table = ResultTable::new();
    let sink: &dyn ResultSink = &table;
    sink.append(jsl_lint::LintResult {
        host: "example.com".into(),
        url: "https://example.com/a.js".into(),
        status: LintStatus::Clean,
        finding_count: 0,
    });
    assert_eq!(table.len(), 1);
}
