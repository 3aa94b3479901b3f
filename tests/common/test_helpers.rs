use std::path::PathBuf;

use valparse::Report;

/// Test fixture paths
pub struct TestFixtures {
    pub fixtures_dir: PathBuf,
}

impl TestFixtures {
    pub fn new() -> Self {
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");

        Self { fixtures_dir }
    }

    /// Two memory errors, no leaks, killed by SIGSEGV
    pub fn bad_report(&self) -> PathBuf {
        self.fixtures_dir.join("bad-test.xml")
    }

    /// Two definite leaks, clean exit
    pub fn leak_report(&self) -> PathBuf {
        self.fixtures_dir.join("leak-test.xml")
    }

    /// Failed `assert()`: SIGABRT with no faulting address
    pub fn abort_report(&self) -> PathBuf {
        self.fixtures_dir.join("abort-test.xml")
    }

    pub fn bad_supp(&self) -> PathBuf {
        self.fixtures_dir.join("bad.supp")
    }

    pub fn load(&self, path: PathBuf) -> Report {
        Report::from_file(&path)
            .unwrap_or_else(|e| panic!("failed to parse {}: {}", path.display(), e))
    }
}

/// A minimal valid report with `body` inserted after the status entries
pub fn report_with_body(body: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<valgrindoutput>
<protocolversion>4</protocolversion>
<protocoltool>memcheck</protocoltool>
<preamble><line>Memcheck, a memory error detector</line></preamble>
<pid>100</pid>
<ppid>99</ppid>
<tool>memcheck</tool>
<args>
  <vargv><exe>/usr/bin/valgrind</exe></vargv>
  <argv><exe>./prog</exe></argv>
</args>
<status><state>RUNNING</state><time>00:00:00:00.010</time></status>
<status><state>FINISHED</state><time>00:00:00:00.020</time></status>
{body}
</valgrindoutput>
"#
    )
}
