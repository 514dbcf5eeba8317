// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex, PoisonError};

use agg_catalog::{Catalog, ContainerId};

/// Handles of the fixture tree built by [`sample_tree`].
///
/// ```text
/// root ("agg.nca")
/// ├── a
/// │   ├── a1
/// │   └── a2
/// └── b
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SampleTree {
    pub root: ContainerId,
    pub a: ContainerId,
    pub a1: ContainerId,
    pub a2: ContainerId,
    pub b: ContainerId,
}

/// Builds the fixture tree, giving every container one dimension and one
/// variable over it.
pub fn sample_tree() -> (Catalog, SampleTree) {
    let mut catalog = Catalog::new();
    let root = catalog.create_root("agg.nca").unwrap();
    let a = catalog.define_container(root, "a").unwrap();
    let a1 = catalog.define_container(a, "a1").unwrap();
    let a2 = catalog.define_container(a, "a2").unwrap();
    let b = catalog.define_container(root, "b").unwrap();
    for id in [root, a, a1, a2, b] {
        let x = catalog.define_dimension(id, "x", 4).unwrap();
        catalog.define_variable(id, "v", &[x]).unwrap();
    }
    (
        catalog,
        SampleTree {
            root,
            a,
            a1,
            a2,
            b,
        },
    )
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` under a debug-level subscriber and returns its result together
/// with every formatted log line it produced.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let buf = SharedBuf::default();
    let writer = buf.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_writer(move || writer.clone())
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let bytes = buf
        .0
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let lines = String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_owned)
        .collect();
    (result, lines)
}

/// Extracts `(event, container)` pairs for the teardown events in `lines`.
pub fn teardown_events(lines: &[String]) -> Vec<(&'static str, String)> {
    let mut events = Vec::new();
    for line in lines {
        let kind = if line.contains("dropped container rows") {
            "rows"
        } else if line.contains("tombstoned container") {
            "tombstone"
        } else if line.contains("skipping container already torn down") {
            "skip"
        } else {
            continue;
        };
        if let Some(container) = field(line, "current") {
            events.push((kind, container));
        }
    }
    events
}

fn field(line: &str, name: &str) -> Option<String> {
    let key = format!("{name}=");
    let start = line.find(&key)? + key.len();
    let rest = &line[start..];
    let end = rest.find(' ').unwrap_or(rest.len());
    Some(rest[..end].to_owned())
}
