use rand::seq::SliceRandom;
use rand::Rng;

static ENGLISH: &str = include_str!("passages/english.txt");

/// Floor on generated passage length, enough for long tests at high speed.
pub const MIN_PASSAGE_CHARS: usize = 15_000;

/// Generous typing speed used to size passages for a given duration.
const SIZING_WPM: usize = 120;

/// Supplies the text the user types.
pub trait PassageProvider {
    fn passage(&self, duration_secs: u32) -> String;
}

/// Characters needed so a fast typist cannot run out of text.
pub fn required_chars(duration_secs: u32) -> usize {
    let for_duration = (duration_secs as usize * SIZING_WPM * 5) / 60;
    MIN_PASSAGE_CHARS.max(for_duration)
}

/// Shuffled built-in sentences, repeated until long enough.
#[derive(Debug, Clone)]
pub struct BuiltinPassages {
    sentences: Vec<&'static str>,
}

impl BuiltinPassages {
    pub fn new() -> Self {
        Self {
            sentences: ENGLISH.lines().filter(|l| !l.trim().is_empty()).collect(),
        }
    }

    pub fn sentences(&self) -> &[&'static str] {
        &self.sentences
    }

    pub fn passage_with_rng<R: Rng + ?Sized>(&self, duration_secs: u32, rng: &mut R) -> String {
        let min_chars = required_chars(duration_secs);
        let mut order: Vec<&str> = self.sentences.clone();
        let mut text = String::with_capacity(min_chars + 256);
        let mut len = 0;

        if order.is_empty() {
            return text;
        }

        'fill: loop {
            order.shuffle(rng);
            for sentence in &order {
                if !text.is_empty() {
                    text.push(' ');
                    len += 1;
                }
                text.push_str(sentence);
                len += sentence.chars().count();
                if len >= min_chars {
                    break 'fill;
                }
            }
        }

        text
    }
}

impl Default for BuiltinPassages {
    fn default() -> Self {
        Self::new()
    }
}

impl PassageProvider for BuiltinPassages {
    fn passage(&self, duration_secs: u32) -> String {
        self.passage_with_rng(duration_secs, &mut rand::thread_rng())
    }
}

/// The same user-supplied text every time.
#[derive(Debug, Clone)]
pub struct FixedPassage(pub String);

impl PassageProvider for FixedPassage {
    fn passage(&self, _duration_secs: u32) -> String {
        self.0.clone()
    }
}
