use serde::de::DeserializeOwned;

use super::types::DocumentCursor;
use super::util::LOG_TARGET;
use crate::errors::DbError;

/// Reads and decodes every document from `cursor`, then closes it.
///
/// Close is attempted on every path. When reading or decoding fails the close
/// is best effort and the read error wins; otherwise a close failure is
/// returned.
pub fn drain_cursor<D: DeserializeOwned>(
    cursor: &mut dyn DocumentCursor,
) -> Result<Vec<D>, DbError> {
    let read = cursor.all().and_then(|docs| {
        docs.into_iter()
            .map(|d| bson::from_document::<D>(d).map_err(DbError::from))
            .collect::<Result<Vec<D>, DbError>>()
    });

    match read {
        Ok(records) => {
            cursor.close()?;
            Ok(records)
        }
        Err(e) => {
            if let Err(close_err) = cursor.close() {
                log::warn!(target: LOG_TARGET, "cursor close after failed read: {close_err}");
            }
            Err(e)
        }
    }
}
