// Note name -> frequency (Hz). "R" is the rest marker and deliberately absent,
// so a rest and a misspelled note both come back as None and play as silence.

pub const REST: &str = "R";

const PITCHES: &[(&str, f32)] = &[
    // octave 1, only the drum tracks use these
    ("C1", 32.70), ("D1", 36.71), ("E1", 41.20), ("F1", 43.65), ("G1", 49.00), ("A1", 55.00), ("B1", 61.74),
    // octave 2, bass
    ("C2", 65.41), ("C#2", 69.30), ("D2", 73.42), ("D#2", 77.78), ("E2", 82.41), ("F2", 87.31),
    ("F#2", 92.50), ("G2", 98.00), ("G#2", 103.83), ("A2", 110.00), ("Bb2", 116.54), ("B2", 123.47),
    // octave 3
    ("C3", 130.81), ("C#3", 138.59), ("D3", 146.83), ("D#3", 155.56), ("E3", 164.81), ("F3", 174.61),
    ("F#3", 185.00), ("G3", 196.00), ("G#3", 207.65), ("A3", 220.00), ("Bb3", 233.08), ("B3", 246.94),
    // octave 4
    ("C4", 261.63), ("C#4", 277.18), ("D4", 293.66), ("D#4", 311.13), ("E4", 329.63), ("F4", 349.23),
    ("F#4", 369.99), ("G4", 392.00), ("G#4", 415.30), ("A4", 440.00), ("Bb4", 466.16), ("B4", 493.88),
    // octave 5
    ("C5", 523.25), ("C#5", 554.37), ("D5", 587.33), ("D#5", 622.25), ("E5", 659.25), ("F5", 698.46),
    ("F#5", 739.99), ("G5", 783.99), ("G#5", 830.61), ("A5", 880.00), ("Bb5", 932.33), ("B5", 987.77),
    // octave 6, sparkle
    ("C6", 1046.50), ("C#6", 1108.73), ("D6", 1174.66), ("E6", 1318.51),
];

pub fn frequency(note: &str) -> Option<f32> {
    PITCHES.iter().find(|(name, _)| *name == note).map(|&(_, hz)| hz)
}

pub fn is_rest(note: &str) -> bool {
    note == REST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_notes() {
        assert_eq!(frequency("A4"), Some(440.0));
        assert_eq!(frequency("C5"), Some(523.25));
        assert_eq!(frequency("Bb2"), Some(116.54));
    }

    #[test]
    fn test_rest_and_unknown_are_silent() {
        assert_eq!(frequency(REST), None);
        assert!(is_rest("R"));
        assert!(!is_rest("H9"));
        assert_eq!(frequency("H9"), None);
        assert_eq!(frequency(""), None);
    }

    #[test]
    fn test_table_is_ascending_and_unique() {
        for pair in PITCHES.windows(2) {
            assert!(pair[0].1 < pair[1].1, "{} !< {}", pair[0].0, pair[1].0);
        }
    }
}
