// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write a downloaded artifact to `path`, or to stdout when no path is set.
pub fn save(payload: &[u8], path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            info!("writing {} bytes to {}", payload.len(), path.display());
            let file = File::create(path)
                .with_context(|| format!("creating '{}'", path.display()))?;
            write_all(BufWriter::with_capacity(1024, file), payload)
                .with_context(|| format!("couldn't write to '{}'", path.display()))
        }
        None => write_all(stdout().lock(), payload).context("couldn't write to stdout"),
    }
}

fn write_all<W: Write>(mut writer: W, payload: &[u8]) -> std::io::Result<()> {
    writer.write_all(payload)?;
    writer.flush()
}
