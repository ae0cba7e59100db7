#![forbid(unsafe_code)]
use crate::src::error::Rav1lrError;
use crate::src::error::Rav1lrResult;
use std::fmt;

/// Wiener filter support, in taps per dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WienerWin {
    Win3 = 3,
    Win5 = 5,
    Win7 = 7,
}

impl WienerWin {
    pub const ALL: [Self; 3] = [Self::Win3, Self::Win5, Self::Win7];

    /// Luma uses the full 7-tap window, chroma the 5-tap one.
    pub const fn for_plane(is_chroma: bool) -> Self {
        if is_chroma {
            Self::Win5
        } else {
            Self::Win7
        }
    }

    pub const fn taps(self) -> usize {
        self as usize
    }

    /// Number of taps in the 2-D neighborhood (length of `M`).
    pub const fn taps2(self) -> usize {
        self.taps() * self.taps()
    }

    pub const fn half(self) -> usize {
        self.taps() >> 1
    }
}

impl TryFrom<usize> for WienerWin {
    type Error = Rav1lrError;

    fn try_from(taps: usize) -> Rav1lrResult<Self> {
        match taps {
            3 => Ok(Self::Win3),
            5 => Ok(Self::Win5),
            7 => Ok(Self::Win7),
            _ => Err(Rav1lrError::InvalidArgument("wiener_win must be 3, 5 or 7")),
        }
    }
}

impl fmt::Display for WienerWin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-tap", self.taps())
    }
}

/// Half-open pixel rectangle `[h_start, h_end) x [v_start, v_end)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RestorationRect {
    pub h_start: usize,
    pub h_end: usize,
    pub v_start: usize,
    pub v_end: usize,
}

impl RestorationRect {
    pub const fn new(h_start: usize, h_end: usize, v_start: usize, v_end: usize) -> Self {
        Self {
            h_start,
            h_end,
            v_start,
            v_end,
        }
    }

    /// Rectangle at `(x, y)` of size `w x h`.
    pub const fn at(x: usize, y: usize, w: usize, h: usize) -> Self {
        Self::new(x, x + w, y, y + h)
    }

    pub const fn width(&self) -> usize {
        self.h_end.saturating_sub(self.h_start)
    }

    pub const fn height(&self) -> usize {
        self.v_end.saturating_sub(self.v_start)
    }

    pub const fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wiener_win_from_taps() {
        assert_eq!(WienerWin::try_from(5), Ok(WienerWin::Win5));
        assert!(matches!(
            WienerWin::try_from(4),
            Err(Rav1lrError::InvalidArgument(_))
        ));
        assert_eq!(WienerWin::Win7.taps2(), 49);
        assert_eq!(WienerWin::Win3.half(), 1);
        assert_eq!(WienerWin::for_plane(true), WienerWin::Win5);
    }

    #[test]
    fn inverted_rect_is_empty() {
        assert!(RestorationRect::new(8, 4, 0, 4).is_empty());
        assert_eq!(RestorationRect::at(2, 3, 10, 5).height(), 5);
    }
}
