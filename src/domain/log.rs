use crate::domain::rts::RtsId;
use serde::{Deserialize, Serialize};

pub type LogId = u64;

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Log {
    pub id: LogId,
    pub rts_id: RtsId,
    pub path: String,
    pub active: bool,
    pub name: String,
}

/// A log file as served by the device, byte for byte.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct LogDownload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl LogDownload {
    pub fn new(rts_id: RtsId, log_id: LogId, content: Vec<u8>) -> Self {
        LogDownload {
            filename: format!("rts_{}_log_{}.txt", rts_id, log_id),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn download_is_named_after_the_rts_and_log() {
        let download = LogDownload::new(3, 12, b"1.0,2.0,3.0\n".to_vec());

        assert_eq!(download.filename, "rts_3_log_12.txt");
        assert_eq!(download.content, b"1.0,2.0,3.0\n");
    }

    #[test]
    fn download_keeps_bytes_that_are_not_utf8() {
        let raw = vec![0x31, 0xff, 0xfe, 0x0a];

        let download = LogDownload::new(1, 2, raw.clone());

        assert_eq!(download.content, raw);
    }
}
