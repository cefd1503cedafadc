use soroban_sdk::String;

use crate::RecordsError;

const MIN_TITLE_LEN: u32 = 1;
const MAX_TITLE_LEN: u32 = 120;

const MAX_DESCRIPTION_LEN: u32 = 500;

const MIN_CID_LEN: u32 = 32;
const MAX_CID_LEN: u32 = 128;

const MIN_KEY_REF_LEN: u32 = 1;
const MAX_KEY_REF_LEN: u32 = 128;

/// 100 MB, the upload ceiling the pinning gateway accepts.
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

fn is_printable_ascii(s: &String, max_len: u32) -> bool {
    let len = s.len() as usize;
    let mut buf = [0u8; 512];
    if len > buf.len() || s.len() > max_len {
        return false;
    }
    s.copy_into_slice(&mut buf[..len]);
    buf[..len].iter().all(|b| (32..=126).contains(b))
}

/// Titles must be non-empty printable ASCII within length bounds.
pub fn validate_title(title: &String) -> Result<(), RecordsError> {
    if !(MIN_TITLE_LEN..=MAX_TITLE_LEN).contains(&title.len())
        || !is_printable_ascii(title, MAX_TITLE_LEN)
    {
        return Err(RecordsError::InvalidTitle);
    }
    Ok(())
}

/// Descriptions may be empty but are capped.
pub fn validate_description(description: &String) -> Result<(), RecordsError> {
    if description.len() > MAX_DESCRIPTION_LEN
        || !is_printable_ascii(description, MAX_DESCRIPTION_LEN)
    {
        return Err(RecordsError::InvalidDescription);
    }
    Ok(())
}

/// Content addresses (IPFS CID, hex digest) are restricted to the characters
/// base58/base32/hex encodings produce.
pub fn validate_cid(cid: &String) -> Result<(), RecordsError> {
    let len = cid.len();
    if !(MIN_CID_LEN..=MAX_CID_LEN).contains(&len) {
        return Err(RecordsError::InvalidContentId);
    }

    let mut buf = [0u8; MAX_CID_LEN as usize];
    cid.copy_into_slice(&mut buf[..len as usize]);
    for &b in &buf[..len as usize] {
        if !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_') {
            return Err(RecordsError::InvalidContentId);
        }
    }

    Ok(())
}

pub fn validate_key_reference(key_ref: &String) -> Result<(), RecordsError> {
    if !(MIN_KEY_REF_LEN..=MAX_KEY_REF_LEN).contains(&key_ref.len()) {
        return Err(RecordsError::InvalidKeyReference);
    }
    Ok(())
}

pub fn validate_file_size(size: u64) -> Result<(), RecordsError> {
    if size == 0 || size > MAX_FILE_SIZE {
        return Err(RecordsError::InvalidFileSize);
    }
    Ok(())
}
