/// Raw, order-preserving key bytes. Produced by [`crate::codec`] or supplied
/// directly by the caller; the indexes never decode them.
pub type Key = Vec<u8>;

/// Identifier of a row in the owning table.
pub type RowId = u64;

/// Width of one packed row identifier inside a bucket.
pub const ROW_ID_WIDTH: usize = 8;

/// Encode a row id into its fixed-width packed form (big-endian).
#[inline]
pub const fn pack_row_id(row_id: RowId) -> [u8; ROW_ID_WIDTH] {
    row_id.to_be_bytes()
}

/// Decode one packed row id. `bytes` must be exactly [`ROW_ID_WIDTH`] long.
#[inline]
pub(crate) fn unpack_row_id(bytes: &[u8]) -> RowId {
    let mut buf = [0u8; ROW_ID_WIDTH];
    buf.copy_from_slice(bytes);
    RowId::from_be_bytes(buf)
}
