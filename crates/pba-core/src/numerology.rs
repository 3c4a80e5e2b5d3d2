use crate::constants::MASTER_NUMBERS;

/// Numerology life path number for a date string.
///
/// Non-digit characters are stripped and the remaining digits summed. The sum
/// is reduced by re-summing its decimal digits until it is a single digit or
/// one of the master numbers (11, 22, 33), which are kept as-is. Input with no
/// digits yields 0.
pub fn life_path(date: &str) -> u32 {
    let mut sum: u32 = date.chars().filter_map(|c| c.to_digit(10)).sum();
    while sum > 9 && !is_master_number(sum) {
        sum = digit_sum(sum);
    }
    sum
}

pub fn is_master_number(n: u32) -> bool {
    MASTER_NUMBERS.contains(&n)
}

fn digit_sum(mut n: u32) -> u32 {
    let mut total = 0;
    while n > 0 {
        total += n % 10;
        n /= 10;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_date() {
        // 1+9+9+0+0+5+1+5 = 30 -> 3
        assert_eq!(life_path("1990-05-15"), 3);
    }

    #[test]
    fn test_empty_and_digitless() {
        assert_eq!(life_path(""), 0);
        assert_eq!(life_path("not-a-date"), 0);
    }

    #[test]
    fn test_master_numbers_preserved() {
        assert_eq!(life_path("1982-01-01"), 22); // 1+9+8+2+0+1+0+1
        assert_eq!(life_path("2000-09-00"), 11); // 2+9
        assert_eq!(life_path("1998-06-00"), 33); // 1+9+9+8+6
    }

    #[test]
    fn test_master_number_reached_after_reduction() {
        // 1+9+9+1+9 = 29 -> 11
        assert_eq!(life_path("1991-09-00"), 11);
    }

    #[test]
    fn test_multi_step_reduction() {
        // 9+9+9+9+9+9+9+9 = 72 -> 9
        assert_eq!(life_path("9999-99-99"), 9);
        // 1+9+8+9+1+2+2+9 = 41 -> 5
        assert_eq!(life_path("1989-12-29"), 5);
    }
}
