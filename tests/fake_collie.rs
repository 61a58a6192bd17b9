//! End-to-end tests against a shell script standing in for `collie`
#![cfg(unix)]

use assert_matches::assert_matches;
use sheepdog_pool_backend::{
    BackendConfig, BackendFactory, Error, ErrorKind, OperationFlags, Pool, PoolHost,
    SheepdogBackend, SheepdogConfig, StorageBackend, TokioProcessRunner, Volume,
};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Write the fake tool; it appends its argv to `calls.log` next to itself
fn install_fake_collie(dir: &Path) -> PathBuf {
    let log = dir.join("calls.log");
    let script = format!(
        r#"#!/bin/sh
echo "$*" >> '{log}'
case "$1 $2" in
"node info")
    printf '0 15245667872 117571104 0%%\n'
    printf 'Total 15245667872 117571104 0%% 20972341\n'
    ;;
"vdi list")
    if [ "$3" = "-r" ]; then
        printf 's test 1 10 0 0 1336556634 7c2b25\n'
        printf '= test 2 10 4 0 1336557203 7c2b26\n'
        printf '= test\\ name 1 10 0 0 1336556634 7c2b25\n'
    elif [ "$3" = "broken" ]; then
        printf '= broken 1 10'
    elif [ "$3" = "latin1" ]; then
        printf '= caf\351 1 10 0 0 1336557216 7c2b27\n'
    else
        printf '= %s 3 2147483648 0 0 1336557216 7c2b27\n' "$3"
    fi
    ;;
"vdi create"|"vdi resize")
    ;;
"vdi delete")
    if [ "$3" = "missing" ]; then
        echo "Failed to open VDI missing" >&2
        exit 1
    fi
    ;;
*)
    echo "unknown command" >&2
    exit 2
    ;;
esac
"#,
        log = log.display()
    );

    let path = dir.join("collie");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn read_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

// One test drives every scenario so the script is written exactly once
// before anything in this binary spawns a process.
#[tokio::test]
async fn test_operations_against_fake_collie() {
    let dir = TempDir::new().unwrap();
    let tool = install_fake_collie(dir.path());

    let config = BackendConfig {
        sheepdog: SheepdogConfig {
            tool_path: tool,
            ..Default::default()
        },
    };
    let backend =
        BackendFactory::create("sheepdog", config, Arc::new(TokioProcessRunner::new())).unwrap();

    // refresh_pool
    let mut pool = Pool::new("sheep").with_host(PoolHost::new("127.0.0.1", 7001));
    backend.refresh_pool(&mut pool).await.unwrap();

    assert_eq!(pool.capacity, 15245667872);
    assert_eq!(pool.allocation, 117571104);
    assert_eq!(pool.available(), 15128096768);
    assert_eq!(pool.volumes.len(), 2);
    assert_eq!(pool.volumes[0].name, "test");
    assert_eq!(pool.volumes[0].allocation, 4);
    assert_eq!(pool.volumes[1].name, "test\\ name");
    assert_eq!(pool.volumes[1].key, "sheep/test\\ name");

    // create_volume populates the record through a follow-up refresh
    let mut volume = Volume::new("vm1", 2147483648);
    backend.create_volume(&pool, &mut volume).await.unwrap();
    assert_eq!(volume.capacity, 2147483648);
    assert_eq!(volume.allocation, 0);
    assert_eq!(volume.key, "sheep/vm1");
    assert_eq!(volume.target, "vm1");

    // refresh_volume with a truncated report leaves the record alone
    let mut broken = Volume::new("broken", 1);
    let err = backend.refresh_volume(&pool, &mut broken).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ParseFailure);
    assert_eq!(broken.capacity, 1);

    // so does one that is not UTF-8; it is not worth retrying
    let mut latin1 = Volume::new("latin1", 1);
    let err = backend.refresh_volume(&pool, &mut latin1).await.unwrap_err();
    assert_matches!(err, Error::Parse { line: 1, .. });
    assert!(!err.is_transient());
    assert_eq!(latin1.capacity, 1);

    backend
        .resize_volume(&pool, &volume, 4294967296, OperationFlags::NONE)
        .await
        .unwrap();
    backend
        .delete_volume(&pool, &volume, OperationFlags::NONE)
        .await
        .unwrap();

    let err = backend
        .delete_volume(&pool, &Volume::new("missing", 0), OperationFlags::NONE)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        Error::CommandFailed { ref diagnostic, .. } if diagnostic == "Failed to open VDI missing"
    );

    assert_eq!(
        read_calls(dir.path()),
        [
            "node info -r -a 127.0.0.1 -p 7001",
            "vdi list -r -a 127.0.0.1 -p 7001",
            "vdi create vm1 2147483648 -a 127.0.0.1 -p 7001",
            "vdi list vm1 -r -a 127.0.0.1 -p 7001",
            "vdi list broken -r -a 127.0.0.1 -p 7001",
            "vdi list latin1 -r -a 127.0.0.1 -p 7001",
            "vdi resize vm1 4294967296 -a 127.0.0.1 -p 7001",
            "vdi delete vm1 -a 127.0.0.1 -p 7001",
            "vdi delete missing -a 127.0.0.1 -p 7001",
        ]
    );

    // A tool that cannot be started is an execution failure
    let missing = SheepdogBackend::with_config(SheepdogConfig {
        tool_path: dir.path().join("no-such-collie"),
        ..Default::default()
    });
    let mut pool = Pool::new("sheep");
    let err = missing.refresh_pool(&mut pool).await.unwrap_err();
    assert_matches!(err, Error::Execution { .. });
    assert_eq!(pool.capacity, 0);
}
