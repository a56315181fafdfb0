//! 单个根目录的遍历（生产者）
use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use walkdir::WalkDir;

use crate::error::{is_walk_permission_denied, ScanError};

/// 递归遍历一个根目录，把每个普通文件路径送入路径队列
/// - 按文件名排序遍历，单个根目录内的入队顺序是确定的
/// - 队列满时 `send` 阻塞，背压由此传回遍历线程
/// - 权限不足的目录/条目静默跳过，继续遍历兄弟节点
/// - 其余错误中止该根目录的遍历并作为该根目录的遍历错误返回
/// - 返回值为入队的文件数
pub fn walk_root(root: &Path, paths: &Sender<PathBuf>) -> Result<usize, ScanError> {
    let mut enqueued = 0usize;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if is_walk_permission_denied(&e) => continue,
            Err(e) => return Err(ScanError::walk(root, e)),
        };
        // 只要普通文件；符号链接、目录、设备文件等一律不入队
        if !entry.file_type().is_file() { continue; }
        // 所有探测线程都已退出时 send 立即失败，此时没有必要继续遍历
        if paths.send(entry.into_path()).is_err() { break; }
        enqueued += 1;
    }

    Ok(enqueued)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn emits_regular_files_in_tree_order() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("b/nested")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("z.txt"), "z").unwrap();
        fs::write(root.join("b/nested/deep.db"), "d").unwrap();
        fs::write(root.join("b/one.bin"), "1").unwrap();
        fs::write(root.join("a/two.bin"), "2").unwrap();

        let (tx, rx) = crossbeam_channel::unbounded();
        let count = walk_root(root, &tx).unwrap();
        drop(tx);
        let got: Vec<PathBuf> = rx.iter().collect();

        assert_eq!(count, 4);
        assert_eq!(
            got,
            vec![
                root.join("a/two.bin"),
                root.join("b/nested/deep.db"),
                root.join("b/one.bin"),
                root.join("z.txt"),
            ]
        );
    }

    #[test]
    fn missing_root_is_a_walk_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");
        let (tx, rx) = crossbeam_channel::unbounded();

        let err = walk_root(&missing, &tx).unwrap_err();
        assert!(matches!(err, ScanError::Walk { .. }));
        assert!(!err.is_permission_denied());
        drop(tx);
        assert_eq!(rx.iter().count(), 0);
    }

    #[test]
    fn stops_early_once_consumers_are_gone() {
        let tmp = TempDir::new().unwrap();
        for i in 0..5 {
            fs::write(tmp.path().join(format!("f{i}")), "x").unwrap();
        }
        let (tx, rx) = crossbeam_channel::bounded(1);
        drop(rx);
        assert_eq!(walk_root(tmp.path(), &tx).unwrap(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn skips_symlinks_and_unreadable_directories() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("real.db"), "x").unwrap();
        std::os::unix::fs::symlink(root.join("real.db"), root.join("alias.db")).unwrap();
        let locked = root.join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("hidden.db"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root 用户无视权限位，此时无法构造权限错误
        let readable = fs::read_dir(&locked).is_ok();

        let (tx, rx) = crossbeam_channel::unbounded();
        let res = walk_root(root, &tx);
        drop(tx);
        let got: Vec<PathBuf> = rx.iter().collect();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert!(res.is_ok());
        assert!(got.contains(&root.join("real.db")));
        assert!(!got.contains(&root.join("alias.db")));
        if !readable {
            assert_eq!(got, vec![root.join("real.db")]);
        }
    }
}
