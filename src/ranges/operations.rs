//! Interval Operations.
//!
//! - [`project()`]: Map a reference-space position into query space through an anchor.
//! - [`unproject()`]: The inverse of [`project()`].

use crate::{error::GffError, gff::record::Strand, Position, PositionOffset};

fn offset(position: Position) -> PositionOffset {
    // GFF positions never come near i64::MAX
    position as PositionOffset
}

/// Project `position`, in the reference space of an anchor starting at `ref_start`, into
/// the anchor's query interval `[query_start, query_end]`.
///
/// For a forward anchor the offset from `ref_start` is added to `query_start`; for a
/// reverse anchor it is subtracted from `query_end`. An unstranded anchor is an error, as
/// is a projected position `<= 0`, which means the anchor does not actually cover the
/// position.
pub fn project(
    ref_start: Position,
    query_start: Position,
    query_end: Position,
    position: Position,
    strand: Strand,
) -> Result<Position, GffError> {
    let delta = offset(position) - offset(ref_start);
    let projected = match strand {
        Strand::Forward => delta + offset(query_start),
        Strand::Reverse => offset(query_end) - delta,
        Strand::Unstranded => return Err(GffError::InvalidStrand(strand.to_string())),
    };
    if projected <= 0 {
        return Err(GffError::OutOfAnchorRange {
            projected,
            ref_start,
            query_start,
            query_end,
            position,
        });
    }
    Ok(projected as Position)
}

/// Map a query-space position back into reference space; the inverse of [`project()`]
/// with the same anchor.
pub fn unproject(
    ref_start: Position,
    query_start: Position,
    query_end: Position,
    projected: Position,
    strand: Strand,
) -> Result<Position, GffError> {
    let position = match strand {
        Strand::Forward => offset(projected) - offset(query_start) + offset(ref_start),
        Strand::Reverse => offset(query_end) - offset(projected) + offset(ref_start),
        Strand::Unstranded => return Err(GffError::InvalidStrand(strand.to_string())),
    };
    if position <= 0 {
        return Err(GffError::OutOfAnchorRange {
            projected: position,
            ref_start,
            query_start,
            query_end,
            position: projected,
        });
    }
    Ok(position as Position)
}
