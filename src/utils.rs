//! Filesystem helpers

use std::fs;
use std::io;
use std::path::Path;

/// Recursively copy `src` into `dst`, creating `dst` and any missing parents
///
/// Symlinks are followed; the copy holds regular files and directories only.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
  fs::create_dir_all(dst)?;
  for entry in fs::read_dir(src)? {
    let entry = entry?;
    let target = dst.join(entry.file_name());
    if entry.path().is_dir() {
      copy_dir_all(&entry.path(), &target)?;
    } else {
      fs::copy(entry.path(), &target)?;
    }
  }
  Ok(())
}
