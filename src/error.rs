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

//! Error kinds surfaced by the API client and the helpers built on it.

use reqwest::StatusCode;

use crate::validate::Kind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value is not a member of the fixed set it must belong to.
    #[error("invalid {kind}: '{value}'")]
    Invalid { kind: Kind, value: String },

    #[error("invalid match specification: {0}")]
    MatchSpec(String),

    #[error("unsupported search key: {0}")]
    UnsupportedKey(String),

    /// The server could not be reached, or the body could not be read.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than the one expected code.
    #[error("{context}: {} [{}]: {body}", .status.canonical_reason().unwrap_or("Unknown"), .status.as_u16())]
    Status {
        context: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to acquire token: {0}")]
    Token(String),

    #[error("no match for {0}")]
    NotFound(String),

    #[error("timed out waiting for status")]
    TimedOut,

    #[error("too many retries waiting for status")]
    TooManyRetries,

    #[error("no hosts matched your criteria")]
    NoHostsMatched,

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
