//! hide — листинги со скрытием служебных каталогов.
//!
//! .backups и .tmp живут прямо под корнем пользовательского дерева и не
//! должны попадать в листинги (cfg.hide_backups управляет фильтром;
//! include_hidden в list_dir позволяет заглянуть внутрь явно).

use anyhow::{Context, Result};
use std::fs;

use crate::errors::VerfsError;
use crate::util::{escapes_root, relpath};

use super::{VersioningFs, BACKUP_DIR_NAME, TMP_DIR_NAME};

impl VersioningFs {
    /// Скрыт ли путь из листингов.
    pub fn is_hidden(&self, path: &str) -> bool {
        if !self.cfg.hide_backups {
            return false;
        }
        let rel = relpath(path);
        matches!(
            rel.split('/').next(),
            Some(BACKUP_DIR_NAME) | Some(TMP_DIR_NAME)
        )
    }

    /// Существует ли live-файл (скрытые пути считаются несуществующими).
    pub fn exists(&self, path: &str) -> bool {
        match self.resolve(path) {
            Ok((_, abs)) => abs.exists(),
            Err(_) => false,
        }
    }

    /// Имена записей каталога (отсортированы). path="" — корень.
    pub fn list_dir(&self, path: &str, include_hidden: bool) -> Result<Vec<String>> {
        let (rel, abs) = self.resolve_dir(path)?;
        if !abs.is_dir() {
            return Err(VerfsError::not_found(rel));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&abs).with_context(|| format!("read_dir {}", abs.display()))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let entry_rel = if rel.is_empty() {
                name.clone()
            } else {
                format!("{}/{}", rel, name)
            };
            if include_hidden || !self.is_hidden(&entry_rel) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Все файлы под path (рекурсивно), относительные пути, скрытые
    /// поддеревья пропускаются целиком. path="" — весь корень.
    pub fn walk_files(&self, path: &str) -> Result<Vec<String>> {
        let (rel, abs) = self.resolve_dir(path)?;
        if !abs.is_dir() {
            return Err(VerfsError::not_found(rel));
        }
        let mut out = Vec::new();
        self.walk_into(&rel, &mut out)?;
        out.sort();
        Ok(out)
    }

    fn walk_into(&self, rel: &str, out: &mut Vec<String>) -> Result<()> {
        let abs = self.root().join(rel);
        for entry in fs::read_dir(&abs).with_context(|| format!("read_dir {}", abs.display()))? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let entry_rel = if rel.is_empty() {
                name
            } else {
                format!("{}/{}", rel, name)
            };
            if self.is_hidden(&entry_rel) {
                continue;
            }
            let ft = entry.file_type()?;
            if ft.is_dir() {
                self.walk_into(&entry_rel, out)?;
            } else if ft.is_file() {
                out.push(entry_rel);
            }
        }
        Ok(())
    }

    // как resolve(), но пустой путь означает корень
    fn resolve_dir(&self, path: &str) -> Result<(String, std::path::PathBuf)> {
        if escapes_root(path) {
            return Err(VerfsError::unsupported(format!(
                "path {:?} escapes the filesystem root",
                path
            )));
        }
        let rel = relpath(path);
        if !rel.is_empty() && self.is_hidden(&rel) {
            return Err(VerfsError::not_found(rel));
        }
        let abs = self.root().join(&rel);
        Ok((rel, abs))
    }
}
