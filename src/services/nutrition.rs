use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::entities::family_member;

/// Household activity level applied on top of the summed BMR.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Moderate,
    VeryActive,
    ExtraActive,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.0,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Parses a stored value, falling back to sedentary for anything unknown.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

/// Mifflin-St Jeor basal metabolic rate in kcal/day, clamped at zero and rounded.
pub fn mifflin_st_jeor(weight_kg: f64, height_cm: f64, age: i32, sex: &str) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let adjusted = if sex.eq_ignore_ascii_case("male") {
        base + 5.0
    } else if sex.eq_ignore_ascii_case("female") {
        base - 161.0
    } else {
        base
    };
    adjusted.max(0.0).round()
}

pub fn member_bmr(member: &family_member::Model) -> f64 {
    mifflin_st_jeor(member.weight_kg, member.height_cm, member.age, &member.sex)
}

/// Sum of every member's rounded BMR.
pub fn household_bmr(members: &[family_member::Model]) -> f64 {
    members.iter().map(member_bmr).sum()
}

/// Daily household need: `round(bmr_sum * multiplier)`.
pub fn household_daily_calories(members: &[family_member::Model], level: ActivityLevel) -> f64 {
    (household_bmr(members) * level.multiplier()).round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn member(age: i32, weight_kg: f64, height_cm: f64, sex: &str) -> family_member::Model {
        family_member::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "member".into(),
            age,
            weight_kg,
            height_cm,
            sex: sex.into(),
            created_at: Utc::now(),
        }
    }

    // 700 + 1093.75 - 150 = 1643.75 before the sex adjustment
    #[rstest]
    #[case("male", 1649.0)]
    #[case("Male", 1649.0)]
    #[case("female", 1483.0)]
    #[case("other", 1644.0)]
    fn sex_adjustment(#[case] sex: &str, #[case] expected: f64) {
        assert_eq!(mifflin_st_jeor(70.0, 175.0, 30, sex), expected);
    }

    #[rstest]
    #[case(ActivityLevel::Sedentary, 1.0)]
    #[case(ActivityLevel::Moderate, 1.55)]
    #[case(ActivityLevel::VeryActive, 1.725)]
    #[case(ActivityLevel::ExtraActive, 1.9)]
    fn activity_multipliers(#[case] level: ActivityLevel, #[case] expected: f64) {
        assert_eq!(level.multiplier(), expected);
    }

    #[test]
    fn bmr_never_goes_negative() {
        assert_eq!(mifflin_st_jeor(1.0, 1.0, 90, "female"), 0.0);
    }

    #[test]
    fn household_calories_apply_multiplier() {
        let members = vec![member(30, 70.0, 175.0, "male"), member(30, 70.0, 175.0, "female")];
        assert_eq!(household_bmr(&members), 3132.0);
        assert_eq!(
            household_daily_calories(&members, ActivityLevel::Sedentary),
            3132.0
        );
        assert_eq!(
            household_daily_calories(&members, ActivityLevel::Moderate),
            (3132.0_f64 * 1.55).round()
        );
    }

    #[test]
    fn unknown_activity_level_is_sedentary() {
        assert_eq!(ActivityLevel::from_stored("couch"), ActivityLevel::Sedentary);
        assert_eq!(
            ActivityLevel::from_stored("very_active"),
            ActivityLevel::VeryActive
        );
        assert_eq!(ActivityLevel::ExtraActive.to_string(), "extra_active");
    }
}
