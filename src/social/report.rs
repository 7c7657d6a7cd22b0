use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ron::ser::{to_writer_pretty, PrettyConfig};
use serde::Serialize;

use crate::social::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserReport {
    pub name: String,
    pub friends: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Output of the `fazebook` binary. Built by
/// [`SocialNetwork::report`](crate::social::network::SocialNetwork::report).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkReport {
    pub users: Vec<UserReport>,
}

impl NetworkReport {
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    /// Replaces `path` with the pretty-printed report.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|error| Error::ReportIo {
            path: path.to_path_buf(),
            error,
        })?;

        let mut writer = BufWriter::new(file);
        to_writer_pretty(&mut writer, self, PrettyConfig::default())?;
        writer.flush().map_err(|error| Error::ReportIo {
            path: path.to_path_buf(),
            error,
        })
    }
}
