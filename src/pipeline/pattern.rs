// The mood -> pattern library. Patterns are plain data: adding a mood means
// adding a variant, a row of sequences and a keyword entry, nothing else.

use serde::{Deserialize, Serialize};

use super::pitch;

// divisor is relative to a whole note: 4 is a quarter, 8 an eighth
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoteStep {
    pub note: &'static str,
    pub divisor: u8,
}

pub const fn step(note: &'static str, divisor: u8) -> NoteStep {
    NoteStep { note, divisor }
}

impl NoteStep {
    pub fn duration(&self, beat_seconds: f64) -> f64 {
        (4.0 / self.divisor.max(1) as f64) * beat_seconds
    }

    pub fn frequency(&self) -> Option<f32> {
        pitch::frequency(self.note)
    }

    pub fn is_rest(&self) -> bool {
        pitch::is_rest(self.note)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackRole {
    Melody,
    Bass,
    Kick,
    Snare,
    HiHat,
    // the ambient loop swaps melody/bass for these
    Pluck,
    Lead,
}

impl TrackRole {
    pub fn label(self) -> &'static str {
        match self {
            TrackRole::Melody => "melody",
            TrackRole::Bass => "bass",
            TrackRole::Kick => "kick",
            TrackRole::Snare => "snare",
            TrackRole::HiHat => "hihat",
            TrackRole::Pluck => "pluck",
            TrackRole::Lead => "lead",
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TrackPart {
    pub role: TrackRole,
    pub steps: &'static [NoteStep],
}

pub const TRACKS_PER_PATTERN: usize = 5;

#[derive(Clone, Copy, Debug)]
pub struct Pattern {
    pub name: &'static str,
    pub tracks: [TrackPart; TRACKS_PER_PATTERN],
}

#[cfg(test)]
impl Pattern {
    pub fn track(&self, role: TrackRole) -> Option<&TrackPart> {
        self.tracks.iter().find(|t| t.role == role)
    }

    pub fn cycle_seconds(&self, role: TrackRole, beat_seconds: f64) -> Option<f64> {
        self.track(role)
            .map(|t| t.steps.iter().map(|s| s.duration(beat_seconds)).sum())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Melancholy,
    // what a tape with no color plays
    #[default]
    Excited,
    Angry,
    Relaxed,
    Mysterious,
    // anything we can't place
    Neutral,
}

// checked in order; first hit wins. color classes first, then mood words.
const KEYWORDS: &[(Mood, &[&str])] = &[
    (Mood::Happy, &["pink"]),
    (Mood::Melancholy, &["blue"]),
    (Mood::Excited, &["amber"]),
    (Mood::Angry, &["red"]),
    (Mood::Relaxed, &["emerald"]),
    (Mood::Mysterious, &["purple"]),
    (Mood::Happy, &["happy"]),
    (Mood::Melancholy, &["sad", "melancholy"]),
    (Mood::Excited, &["excit", "throb"]),
    (Mood::Angry, &["angr"]),
    (Mood::Relaxed, &["relax"]),
    (Mood::Mysterious, &["myster"]),
];

impl Mood {
    pub const CANONICAL: [Mood; 6] = [
        Mood::Happy,
        Mood::Melancholy,
        Mood::Excited,
        Mood::Angry,
        Mood::Relaxed,
        Mood::Mysterious,
    ];

    /// Maps a free-form key (a color class like "bg-pink-500", a mood word like
    /// "Melancholy", or the canonical name) onto a mood. Never fails.
    pub fn from_key(key: &str) -> Mood {
        let key = key.to_ascii_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| key.contains(w)))
            .map(|&(mood, _)| mood)
            .unwrap_or(Mood::Neutral)
    }

    pub fn pattern(self) -> &'static Pattern {
        match self {
            Mood::Happy => &HAPPY,
            Mood::Melancholy => &MELANCHOLY,
            Mood::Excited => &EXCITED,
            Mood::Angry => &ANGRY,
            Mood::Relaxed => &RELAXED,
            Mood::Mysterious => &MYSTERIOUS,
            Mood::Neutral => &FALLBACK,
        }
    }

    pub fn label(self) -> &'static str {
        self.pattern().name
    }
}


// ── shared drum lines ─────────────────────────────────────────────

const KICK_FOUR: &[NoteStep] = &[step("C1", 4), step("C1", 4), step("C1", 4), step("C1", 4)];
const KICK_SPACED: &[NoteStep] = &[step("C1", 4), step("R", 4), step("C1", 4), step("R", 4)];
const KICK_HALF: &[NoteStep] = &[step("C1", 2), step("C1", 2)];
const SNARE_BACKBEAT: &[NoteStep] = &[step("R", 4), step("D1", 4), step("R", 4), step("D1", 4)];
const SNARE_EIGHTHS: &[NoteStep] = &[
    step("R", 8), step("D1", 8), step("R", 8), step("D1", 8),
    step("R", 8), step("D1", 8), step("R", 8), step("D1", 8),
];
const HAT_EIGHTHS: &[NoteStep] = &[
    step("F1", 8), step("F1", 8), step("F1", 8), step("F1", 8),
    step("F1", 8), step("F1", 8), step("F1", 8), step("F1", 8),
];
const HAT_QUARTERS: &[NoteStep] = &[step("F1", 4), step("F1", 4), step("F1", 4), step("F1", 4)];

const fn main_loop(
    name: &'static str,
    melody: &'static [NoteStep],
    bass: &'static [NoteStep],
    kick: &'static [NoteStep],
    snare: &'static [NoteStep],
    hihat: &'static [NoteStep],
) -> Pattern {
    Pattern {
        name,
        tracks: [
            TrackPart { role: TrackRole::Melody, steps: melody },
            TrackPart { role: TrackRole::Bass, steps: bass },
            TrackPart { role: TrackRole::Kick, steps: kick },
            TrackPart { role: TrackRole::Snare, steps: snare },
            TrackPart { role: TrackRole::HiHat, steps: hihat },
        ],
    }
}

// ── happy: jumpy eighths, major triads ────────────────────────────

const HAPPY_MELODY: &[NoteStep] = &[
    step("C4", 8), step("D4", 8), step("E4", 8), step("G4", 8), step("C5", 4),
    step("E4", 8), step("G4", 8), step("C5", 8), step("D5", 8), step("E5", 4),
    step("G4", 8), step("E4", 8), step("C4", 8), step("G4", 8), step("R", 4),
    step("C4", 8), step("E4", 8), step("G4", 8), step("C5", 8), step("D5", 4),
];
const HAPPY_BASS: &[NoteStep] = &[
    step("C3", 4), step("G3", 4), step("E3", 4), step("G3", 4),
    step("C3", 4), step("G3", 4), step("F3", 4), step("G3", 4),
];
pub static HAPPY: Pattern =
    main_loop("happy", HAPPY_MELODY, HAPPY_BASS, KICK_FOUR, SNARE_BACKBEAT, HAT_EIGHTHS);

// ── melancholy: slow quarters and halves, minor leaning ───────────

const MELANCHOLY_MELODY: &[NoteStep] = &[
    step("D4", 4), step("F4", 4), step("E4", 4), step("D4", 4), step("C4", 2), step("R", 2),
    step("E4", 4), step("D4", 4), step("C4", 4), step("A3", 4), step("G3", 2), step("R", 2),
    step("D4", 4), step("C4", 4), step("E4", 4), step("D4", 4), step("C4", 2), step("R", 2),
    step("G3", 4), step("E4", 4), step("D4", 4), step("F4", 4), step("E4", 2), step("R", 2),
];
const MELANCHOLY_BASS: &[NoteStep] = &[
    step("D3", 2), step("C3", 2), step("A2", 2), step("G2", 2),
    step("D3", 2), step("C3", 2), step("G2", 2), step("E2", 2),
];
pub static MELANCHOLY: Pattern = main_loop(
    "melancholy",
    MELANCHOLY_MELODY,
    MELANCHOLY_BASS,
    KICK_SPACED,
    SNARE_EIGHTHS,
    HAT_QUARTERS,
);

// ── excited: fast and urgent ──────────────────────────────────────

const EXCITED_MELODY: &[NoteStep] = &[
    step("C4", 8), step("E4", 8), step("G4", 8), step("A4", 8), step("R", 4),
    step("C5", 8), step("D5", 8), step("E5", 8), step("G4", 8), step("R", 4),
    step("G4", 8), step("F4", 8), step("E4", 8), step("D4", 8), step("R", 4),
    step("A4", 8), step("E4", 8), step("G4", 8), step("C5", 8), step("R", 4),
];
const EXCITED_BASS: &[NoteStep] = &[
    step("C3", 4), step("A2", 4), step("C3", 4), step("G3", 4),
    step("G3", 4), step("F3", 4), step("A3", 4), step("C4", 4),
];
pub static EXCITED: Pattern =
    main_loop("excited", EXCITED_MELODY, EXCITED_BASS, KICK_HALF, SNARE_BACKBEAT, HAT_EIGHTHS);

// ── angry: heavy, descending runs ─────────────────────────────────

const ANGRY_MELODY: &[NoteStep] = &[
    step("G4", 8), step("F4", 8), step("E4", 8), step("D4", 8), step("C4", 2),
    step("D4", 8), step("C4", 8), step("B3", 8), step("A3", 8), step("R", 2),
    step("C4", 8), step("E4", 8), step("G4", 8), step("A4", 8), step("R", 2),
    step("D4", 8), step("E4", 8), step("G4", 8), step("F4", 8), step("E4", 2),
];
const ANGRY_BASS: &[NoteStep] = &[
    step("G2", 4), step("C3", 4), step("D3", 4), step("A2", 4),
    step("C3", 4), step("A3", 4), step("D3", 4), step("E3", 4),
];
const ANGRY_SNARE: &[NoteStep] = &[step("R", 2), step("D1", 2)];
pub static ANGRY: Pattern =
    main_loop("angry", ANGRY_MELODY, ANGRY_BASS, KICK_HALF, ANGRY_SNARE, HAT_QUARTERS);

// ── relaxed: flowing, chill ───────────────────────────────────────

const RELAXED_MELODY: &[NoteStep] = &[
    step("C4", 4), step("E4", 4), step("G4", 4), step("E4", 4),
    step("D4", 2), step("R", 2),
    step("C4", 4), step("G4", 4), step("E4", 4), step("C4", 4),
    step("F4", 4), step("G4", 4), step("E4", 4), step("C4", 4),
];
const RELAXED_BASS: &[NoteStep] = &[
    step("C3", 2), step("G3", 2), step("D3", 2), step("R", 2),
    step("C3", 2), step("E3", 2), step("F3", 2), step("C3", 2),
];
pub static RELAXED: Pattern =
    main_loop("relaxed", RELAXED_MELODY, RELAXED_BASS, KICK_SPACED, SNARE_EIGHTHS, HAT_EIGHTHS);

// ── mysterious: sparse, minor ─────────────────────────────────────

const MYSTERIOUS_MELODY: &[NoteStep] = &[
    step("E4", 4), step("G4", 4), step("F4", 4), step("E4", 4), step("D4", 2), step("R", 2),
    step("G4", 4), step("A4", 4), step("G4", 4), step("E4", 4), step("C4", 2), step("R", 2),
    step("F4", 4), step("G4", 4), step("E4", 4), step("D4", 4), step("C4", 2), step("R", 2),
    step("D4", 4), step("G4", 4), step("E4", 4), step("C4", 4), step("R", 4),
];
const MYSTERIOUS_BASS: &[NoteStep] = &[
    step("E3", 2), step("F3", 2), step("G3", 2), step("R", 2),
    step("G3", 2), step("A3", 2), step("F3", 2), step("C3", 2),
];
pub static MYSTERIOUS: Pattern = main_loop(
    "mysterious",
    MYSTERIOUS_MELODY,
    MYSTERIOUS_BASS,
    KICK_SPACED,
    SNARE_EIGHTHS,
    HAT_EIGHTHS,
);

// ── fallback ──────────────────────────────────────────────────────

const FALLBACK_MELODY: &[NoteStep] = &[step("C5", 4), step("E5", 4), step("G5", 2)];
const FALLBACK_BASS: &[NoteStep] = &[step("C3", 4), step("G3", 4), step("C3", 2)];
const FALLBACK_KICK: &[NoteStep] = &[step("C1", 4), step("C1", 4)];
const FALLBACK_SNARE: &[NoteStep] = &[step("R", 4), step("D1", 4)];
const FALLBACK_HAT: &[NoteStep] = &[step("F1", 8), step("F1", 8)];
pub static FALLBACK: Pattern = main_loop(
    "neutral",
    FALLBACK_MELODY,
    FALLBACK_BASS,
    FALLBACK_KICK,
    FALLBACK_SNARE,
    FALLBACK_HAT,
);

// ── ambient (lobby) loop: C - F - G - Am arpeggios under a slow lead ──

const AMBIENT_PLUCK: &[NoteStep] = &[
    step("C4", 8), step("E4", 8), step("G4", 8), step("E4", 8), step("C4", 8), step("E4", 8), step("G4", 8), step("E4", 8),
    step("F4", 8), step("A4", 8), step("C5", 8), step("A4", 8), step("F4", 8), step("A4", 8), step("C5", 8), step("A4", 8),
    step("G4", 8), step("B4", 8), step("D5", 8), step("B4", 8), step("G4", 8), step("B4", 8), step("D5", 8), step("B4", 8),
    step("A4", 8), step("C5", 8), step("E5", 8), step("C5", 8), step("A4", 8), step("C5", 8), step("E5", 8), step("C5", 8),
];
const AMBIENT_LEAD: &[NoteStep] = &[
    step("C4", 8), step("E4", 8), step("G4", 8), step("C5", 8), step("E5", 2), step("R", 4),
    step("D4", 8), step("E4", 8), step("F4", 8), step("G4", 8), step("A4", 2), step("R", 4),
    step("C4", 8), step("G4", 8), step("E4", 8), step("C5", 8), step("R", 2),
    step("F4", 8), step("A4", 8), step("G4", 8), step("F4", 8), step("E4", 2), step("R", 4),
    step("G4", 8), step("E4", 8), step("C4", 8), step("G4", 8), step("R", 2),
    step("F4", 8), step("E4", 8), step("D4", 8), step("C4", 8), step("R", 2),
    step("E4", 8), step("G4", 8), step("C5", 8), step("E4", 8), step("R", 2),
    step("D4", 8), step("F4", 8), step("A4", 8), step("G4", 8), step("R", 2),
    step("C5", 8), step("E5", 8), step("G5", 8), step("C5", 8), step("R", 2),
    step("C4", 8), step("E4", 8), step("G4", 8), step("C5", 8), step("R", 2),
    step("F4", 8), step("G4", 8), step("A4", 8), step("G4", 8), step("R", 2),
    step("D4", 8), step("E4", 8), step("C4", 8), step("F4", 8), step("R", 2),
    step("R", 1),
];

pub static AMBIENT: Pattern = Pattern {
    name: "ambient",
    tracks: [
        TrackPart { role: TrackRole::Pluck, steps: AMBIENT_PLUCK },
        TrackPart { role: TrackRole::Lead, steps: AMBIENT_LEAD },
        TrackPart { role: TrackRole::Kick, steps: KICK_FOUR },
        TrackPart { role: TrackRole::Snare, steps: SNARE_BACKBEAT },
        TrackPart { role: TrackRole::HiHat, steps: HAT_EIGHTHS },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    const BEAT: f64 = 0.5;

    fn all_patterns() -> Vec<&'static Pattern> {
        let mut all: Vec<_> = Mood::CANONICAL.iter().map(|m| m.pattern()).collect();
        all.push(Mood::Neutral.pattern());
        all.push(&AMBIENT);
        all
    }

    #[test]
    fn test_step_durations() {
        assert_eq!(step("C4", 4).duration(BEAT), 0.5);
        assert_eq!(step("C4", 8).duration(BEAT), 0.25);
        assert_eq!(step("C4", 2).duration(BEAT), 1.0);
        assert_eq!(step("R", 1).duration(BEAT), 2.0);
    }

    #[test]
    fn test_every_track_is_non_empty_with_positive_durations() {
        for pattern in all_patterns() {
            for part in &pattern.tracks {
                assert!(!part.steps.is_empty(), "{} {:?}", pattern.name, part.role);
                for s in part.steps {
                    assert!(s.divisor > 0);
                    assert!(s.duration(BEAT) > 0.0);
                }
            }
        }
    }

    #[test]
    fn test_every_non_rest_note_is_in_the_pitch_table() {
        for pattern in all_patterns() {
            for part in &pattern.tracks {
                for s in part.steps {
                    assert!(s.note == pitch::REST || s.frequency().is_some(), "{}", s.note);
                }
            }
        }
    }

    #[test]
    fn test_main_patterns_have_the_five_main_roles() {
        for mood in Mood::CANONICAL.iter().chain([Mood::Neutral].iter()) {
            let p = mood.pattern();
            for role in [TrackRole::Melody, TrackRole::Bass, TrackRole::Kick, TrackRole::Snare, TrackRole::HiHat] {
                assert!(p.track(role).is_some(), "{} lacks {:?}", p.name, role);
            }
        }
        assert!(AMBIENT.track(TrackRole::Pluck).is_some());
        assert!(AMBIENT.track(TrackRole::Melody).is_none());
    }

    #[test]
    fn test_color_keys_match_canonical_moods() {
        assert_eq!(Mood::from_key("bg-pink-500"), Mood::Happy);
        assert_eq!(Mood::from_key("happy"), Mood::Happy);
        assert!(std::ptr::eq(Mood::from_key("contains pink").pattern(), Mood::from_key("happy").pattern()));
        assert_eq!(Mood::from_key("bg-blue-700"), Mood::Melancholy);
        assert_eq!(Mood::from_key("bg-amber-600"), Mood::Excited);
        assert_eq!(Mood::from_key("bg-red-600"), Mood::Angry);
        assert_eq!(Mood::from_key("bg-emerald-500"), Mood::Relaxed);
        assert_eq!(Mood::from_key("bg-purple-600"), Mood::Mysterious);
    }

    #[test]
    fn test_mood_words_are_case_tolerant() {
        assert_eq!(Mood::from_key("Melancholy"), Mood::Melancholy);
        assert_eq!(Mood::from_key("Feeling SAD"), Mood::Melancholy);
        assert_eq!(Mood::from_key("Excitement"), Mood::Excited);
        assert_eq!(Mood::from_key("ANGRY"), Mood::Angry);
        assert_eq!(Mood::from_key("Relaxing"), Mood::Relaxed);
        assert_eq!(Mood::from_key("mysterious"), Mood::Mysterious);
    }

    #[test]
    fn test_unknown_key_falls_back() {
        assert_eq!(Mood::from_key("bg-teal-600"), Mood::Neutral);
        assert_eq!(Mood::from_key(""), Mood::Neutral);
        assert!(std::ptr::eq(Mood::from_key("zzz").pattern(), &FALLBACK));
        assert_eq!(Mood::default(), Mood::Excited);
    }

    #[test]
    fn test_mood_serializes_lowercase() {
        let json = serde_json::to_string(&Mood::Mysterious).unwrap();
        assert_eq!(json, "\"mysterious\"");
        let back: Mood = serde_json::from_str("\"relaxed\"").unwrap();
        assert_eq!(back, Mood::Relaxed);
    }

    #[test]
    fn test_cycle_length() {
        assert_eq!(HAPPY.cycle_seconds(TrackRole::Melody, BEAT), Some(6.0));
        assert_eq!(HAPPY.cycle_seconds(TrackRole::Kick, BEAT), Some(2.0));
    }
}
