//! File reading workers.
//!
//! Both workers report through the channel and never panic on bad files;
//! a failed send means the UI has gone away and is ignored.

use std::path::Path;
use std::sync::mpsc::Sender;
use std::time::Instant;

use anyhow::Context;
use log::{info, warn};

use crate::message::AppMessage;

/// Lists the NXdata groups of `path`.
pub fn list_groups_worker(path: &Path, tx: &Sender<AppMessage>) {
    match nxplot_io::list_nxdata(path) {
        Ok(groups) => {
            info!("{}: {} NXdata group(s)", path.display(), groups.len());
            let _ = tx.send(AppMessage::GroupsListed(path.to_path_buf(), groups));
        }
        Err(e) => {
            warn!("cannot list {}: {e}", path.display());
            let _ = tx.send(AppMessage::LoadError(format!("{}: {e}", path.display())));
        }
    }
}

/// Reads one group of `path`.
pub fn load_group_worker(path: &Path, group: &str, tx: &Sender<AppMessage>) {
    let start = Instant::now();
    let result = nxplot_io::read_nxdata(path, group)
        .with_context(|| format!("reading {group} from {}", path.display()));
    let _ = match result {
        Ok(data) => tx.send(AppMessage::GroupLoaded {
            path: path.to_path_buf(),
            group: group.to_string(),
            data: data.shared(),
            elapsed: start.elapsed(),
        }),
        Err(e) => {
            warn!("{e:#}");
            tx.send(AppMessage::LoadError(format!("{e:#}")))
        }
    };
}
