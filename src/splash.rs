//! Preloader shown while the screen mounts: "farmer" in several languages,
//! one word at a time, then a slide-up before the location lookup starts.

/// Hindi, Telugu, Kannada, Bengali, Gujarati, Punjabi, Tamil, English.
pub const FARMER_WORDS: [&str; 8] = [
    "किसान",
    "రైతు",
    "ರೈತ",
    "কৃষক",
    "ખેડૂત",
    "ਕਿਸਾਨ",
    "உழவன்",
    "Farmer",
];

const WORD_DELAY_MS: u64 = 50;
const FADE_IN_MS: u64 = 300;
const HOLD_MS: u64 = 400;
const SLIDE_DELAY_MS: u64 = 200;
const SLIDE_MS: u64 = 600;

const WORD_SLOT_MS: u64 = WORD_DELAY_MS + FADE_IN_MS + HOLD_MS;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SplashPhase {
    /// `opacity` in 0..=1 while the word fades in.
    Word { index: usize, opacity: f64 },
    /// Last word sliding off, `progress` in 0..=1.
    SlideUp { progress: f64 },
    Done,
}

#[derive(Clone, Copy, Debug)]
pub struct Preloader {
    started_ms: u64,
}

impl Preloader {
    pub fn new(now_ms: u64) -> Self {
        Self { started_ms: now_ms }
    }

    /// Total time from start to [`SplashPhase::Done`].
    pub const fn duration_ms() -> u64 {
        WORD_SLOT_MS * FARMER_WORDS.len() as u64 + SLIDE_DELAY_MS + SLIDE_MS
    }

    pub fn phase(&self, now_ms: u64) -> SplashPhase {
        let elapsed = now_ms.saturating_sub(self.started_ms);
        let words_ms = WORD_SLOT_MS * FARMER_WORDS.len() as u64;

        if elapsed < words_ms {
            let index = (elapsed / WORD_SLOT_MS) as usize;
            let into_slot = elapsed % WORD_SLOT_MS;
            let opacity = into_slot.saturating_sub(WORD_DELAY_MS).min(FADE_IN_MS) as f64
                / FADE_IN_MS as f64;
            return SplashPhase::Word { index, opacity };
        }

        let into_slide = elapsed - words_ms;
        if into_slide < SLIDE_DELAY_MS + SLIDE_MS {
            let progress = into_slide.saturating_sub(SLIDE_DELAY_MS) as f64 / SLIDE_MS as f64;
            return SplashPhase::SlideUp { progress };
        }
        SplashPhase::Done
    }

    /// Word currently on screen; the last one stays up during the slide.
    pub fn word(&self, now_ms: u64) -> Option<&'static str> {
        match self.phase(now_ms) {
            SplashPhase::Word { index, .. } => FARMER_WORDS.get(index).copied(),
            SplashPhase::SlideUp { .. } => FARMER_WORDS.last().copied(),
            SplashPhase::Done => None,
        }
    }

    pub fn is_done(&self, now_ms: u64) -> bool {
        self.phase(now_ms) == SplashPhase::Done
    }
}
