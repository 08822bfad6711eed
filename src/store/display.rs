use crate::model::User;

const FALLBACK_LETTER: &str = "A";

/// Short label for a joining user: the uppercased first letter of their name,
/// plus an ordinal when current occupants already use that letter ("J", "J2", "J3").
///
/// Only the people in the room right now are counted, so a label freed by
/// someone leaving can be handed out again while a later ordinal is still taken.
pub fn get_display_char(name: &str, participants: &[User]) -> String {
    let letter = name
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().collect::<String>())
        .unwrap_or_else(|| FALLBACK_LETTER.to_owned());

    let in_use = participants
        .iter()
        .filter(|p| uses_letter(&p.display_char, &letter))
        .count();

    if in_use == 0 {
        letter
    } else {
        format!("{letter}{}", in_use + 1)
    }
}

fn uses_letter(display_char: &str, letter: &str) -> bool {
    display_char
        .strip_prefix(letter)
        .is_some_and(|rest| rest.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_chars(chars: &[&str]) -> Vec<User> {
        chars
            .iter()
            .map(|c| User::participant("someone", (*c).to_owned()))
            .collect()
    }

    #[test]
    fn first_letter_when_free() {
        assert_eq!(get_display_char("Jane", &[]), "J");
        assert_eq!(get_display_char("bob", &[]), "B");
    }

    #[test]
    fn ordinal_when_taken() {
        assert_eq!(get_display_char("Jane", &with_chars(&["J"])), "J2");
        assert_eq!(get_display_char("jim", &with_chars(&["J", "J2"])), "J3");
    }

    #[test]
    fn host_label_counts_as_taken() {
        let host = User::host("Alice");
        assert_eq!(get_display_char("Harry", &[host]), "H2");
    }

    #[test]
    fn empty_name_falls_back_to_a() {
        assert_eq!(get_display_char("", &[]), "A");
        assert_eq!(get_display_char("   ", &[]), "A");
        assert_eq!(get_display_char("", &with_chars(&["A"])), "A2");
    }

    #[test]
    fn other_letters_do_not_count() {
        assert_eq!(get_display_char("Jane", &with_chars(&["K", "B", "H"])), "J");
    }

    #[test]
    fn freed_label_can_collide_with_survivor() {
        // "J" left, "J2" stayed: one J in the room, so the next J gets "J2" again
        assert_eq!(get_display_char("Jo", &with_chars(&["J2"])), "J2");
    }
}
