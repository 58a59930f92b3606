//! The window-spanning search loop shared by every [`SequenceSearcher`].
//!
//! A candidate match always extends forward from its start position
//! (`position .. position + pattern.length()`), regardless of which
//! direction we are scanning *for* candidates in. So in either direction,
//! a candidate is only at risk of straddling a window boundary when it
//! starts within the last `pattern.length() - 1` bytes of the window that
//! contains it; those candidates are verified one at a time with
//! [`SequenceMatcher::matches_reader`], and every other candidate is
//! handed to the array-based searcher over a slice of the current window.

use crate::error::Result;
use crate::matcher::SequenceMatcher;
use crate::reader::WindowReader;

use super::SequenceSearcher;

pub(crate) fn search_reader_forwards<S: SequenceSearcher + ?Sized>(
    searcher: &S,
    reader: &mut dyn WindowReader,
    from: u64,
    to: u64,
) -> Result<i64> {
    if from > to {
        return Ok(-1);
    }
    let pattern_len = searcher.pattern().length();
    let mut position = from;

    loop {
        if position > to {
            return Ok(-1);
        }
        let window = match reader.get_window(position)? {
            Some(window) => window,
            None => return Ok(-1),
        };
        let window_start = window.position();
        let window_len = window.length();
        let array = window.array()?;
        let local_from = (position - window_start) as usize;
        let local_to_bound = to.saturating_sub(window_start).min(window_len as u64 - 1) as usize;

        if window_len >= pattern_len {
            let fits_end = window_len - pattern_len;
            let local_to = fits_end.min(local_to_bound);
            if local_from <= local_to {
                let found = searcher.search_forwards(&array, local_from as i64, local_to as i64);
                if found >= 0 {
                    return Ok(window_start as i64 + found);
                }
            }
        }

        let straddle_start = local_from.max(window_len.saturating_sub(pattern_len.saturating_sub(1)));
        for offset in straddle_start..=local_to_bound {
            let candidate = window_start + offset as u64;
            if searcher.pattern().matches_reader(reader, candidate)? {
                return Ok(candidate as i64);
            }
        }

        let next = window_start + window_len as u64;
        if next > to {
            return Ok(-1);
        }
        position = next;
    }
}

pub(crate) fn search_reader_backwards<S: SequenceSearcher + ?Sized>(
    searcher: &S,
    reader: &mut dyn WindowReader,
    from: u64,
    to: u64,
) -> Result<i64> {
    if from < to {
        return Ok(-1);
    }
    let pattern_len = searcher.pattern().length();
    let mut position = from;

    loop {
        if position < to {
            return Ok(-1);
        }
        let window = match reader.get_window(position)? {
            Some(window) => window,
            None => {
                // `position` is past end-of-source; there is nothing to
                // search at or after it, only before. Find the window
                // that ends at end-of-source instead by asking for the
                // byte just before it, if any.
                if position == 0 {
                    return Ok(-1);
                }
                position -= 1;
                continue;
            }
        };
        let window_start = window.position();
        let window_len = window.length();
        let array = window.array()?;
        let local_from = (position - window_start).min(window_len as u64 - 1) as usize;
        let local_to_bound = to.saturating_sub(window_start);
        let local_to_bound = if to < window_start { 0 } else { local_to_bound as usize };

        // Candidates in the last `pattern_len - 1` offsets might straddle
        // into the next window; try those first, highest offset first,
        // since we are searching in descending order.
        let straddle_floor = window_len.saturating_sub(pattern_len.saturating_sub(1));
        if local_from + 1 > straddle_floor {
            for offset in (straddle_floor..=local_from).rev() {
                let candidate = window_start + offset as u64;
                if candidate < to {
                    break;
                }
                if searcher.pattern().matches_reader(reader, candidate)? {
                    return Ok(candidate as i64);
                }
            }
        }

        if window_len >= pattern_len {
            let fits_end = (window_len - pattern_len).min(local_from);
            if fits_end + 1 > local_to_bound {
                let found =
                    searcher.search_backwards(&array, fits_end as i64, local_to_bound as i64);
                if found >= 0 {
                    return Ok(window_start as i64 + found);
                }
            }
        }

        if window_start <= to || window_start == 0 {
            return Ok(-1);
        }
        position = window_start - 1;
    }
}
