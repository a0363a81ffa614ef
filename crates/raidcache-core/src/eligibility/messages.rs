//! User-facing message templates.
//!
//! These strings reach end users unchanged; keep their wording stable.

pub fn no_members() -> String {
    "Team has no members".to_string()
}

pub fn no_categories() -> String {
    "No age category defined for this race".to_string()
}

pub fn missing_birth_date(name: &str) -> String {
    format!("{}: birth date not provided", name)
}

pub fn age_not_accepted(name: &str, age: i32) -> String {
    format!("{}: age {} not accepted for this race", name, age)
}

pub fn mixed_categories(categories: &[&str]) -> String {
    format!(
        "All members must belong to the same age category (found: {})",
        categories.join(", ")
    )
}

pub fn member_category(name: &str, category: &str, age: i32) -> String {
    format!("{}: {} ({} years)", name, category, age)
}

pub fn below_minimum_age(name: &str, age: i32, min: i32) -> String {
    format!("{}: age {}, minimum required: {}", name, age, min)
}

pub fn supervisor_required(intermediate: i32, supervisor: i32) -> String {
    format!(
        "Members under {} must be accompanied by a supervisor aged {} or older",
        intermediate, supervisor
    )
}

pub fn needs_supervision(name: &str, age: i32) -> String {
    format!("{} ({} years) requires supervision", name, age)
}

pub fn supervised_by(names: &[String]) -> String {
    format!("Supervision provided by: {}", names.join(", "))
}

pub fn exact_size(max: u32, count: usize) -> String {
    format!("Team must have exactly {} members (has {})", max, count)
}

pub fn too_few(min: u32, count: usize) -> String {
    format!("Team must have at least {} members (has {})", min, count)
}

pub fn too_many(max: u32, count: usize) -> String {
    format!("Team cannot have more than {} members (has {})", max, count)
}

pub fn team_limit_reached(current: u32, max: u32) -> String {
    format!("Team limit reached ({}/{})", current, max)
}

pub fn participant_limit_exceeded(total: u64, max: u32) -> String {
    format!("Participant limit would be exceeded ({} > {})", total, max)
}
