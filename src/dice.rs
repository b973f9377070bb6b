//! Dice-pip hint for reverse counting.

/// Faces needed to show `value`: one face up to six, otherwise a six plus
/// the remainder. Values above twelve keep adding sixes.
pub fn dice_faces(value: u32) -> Vec<u8> {
    let mut faces = Vec::new();
    let mut remaining = value;
    while remaining > 6 {
        faces.push(6);
        remaining -= 6;
    }
    if remaining > 0 {
        faces.push(remaining as u8);
    }
    faces
}

/// Lit cells of a 3x3 grid (row, column) for a face.
pub fn pip_positions(face: u8) -> &'static [(u8, u8)] {
    match face {
        1 => &[(1, 1)],
        2 => &[(0, 0), (2, 2)],
        3 => &[(0, 0), (1, 1), (2, 2)],
        4 => &[(0, 0), (0, 2), (2, 0), (2, 2)],
        5 => &[(0, 0), (0, 2), (1, 1), (2, 0), (2, 2)],
        6 => &[(0, 0), (0, 2), (1, 0), (1, 2), (2, 0), (2, 2)],
        _ => &[],
    }
}

/// Three text rows for a face, `●` for a pip.
pub fn face_rows(face: u8) -> [String; 3] {
    let pips = pip_positions(face);
    [0u8, 1, 2].map(|row| {
        (0u8..3)
            .map(|column| {
                if pips.contains(&(row, column)) {
                    '●'
                } else {
                    '·'
                }
            })
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_values_use_one_face() {
        for value in 1..=6 {
            assert_eq!(dice_faces(value), vec![value as u8]);
        }
    }

    #[test]
    fn large_values_add_a_six() {
        assert_eq!(dice_faces(7), vec![6, 1]);
        assert_eq!(dice_faces(10), vec![6, 4]);
        assert_eq!(dice_faces(12), vec![6, 6]);
    }

    #[test]
    fn zero_has_no_face() {
        assert!(dice_faces(0).is_empty());
    }

    #[test]
    fn pip_count_matches_face() {
        for face in 1..=6u8 {
            assert_eq!(pip_positions(face).len(), face as usize);
        }
        assert!(pip_positions(7).is_empty());
    }

    #[test]
    fn face_rows_render_pips() {
        assert_eq!(face_rows(1), ["···".to_string(), "·●·".into(), "···".into()]);
        assert_eq!(face_rows(6)[1], "●·●");
    }
}
