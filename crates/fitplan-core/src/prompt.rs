//! Prompt construction for the plan-generating model.
//!
//! Pure string templating. The exercise list embedded in the prompt is the
//! only set of ids the model is allowed to use.

use std::fmt::Write as _;

use fitplan_db::models::Exercise;

use crate::request::{ExperienceLevel, PlanRequest};

/// Days in a generated plan.
pub const DAYS_PER_WEEK: usize = 7;

/// Equipment value that is always available, whatever the user owns.
const BODY_WEIGHT: &str = "body weight";

/// Example exercise entry shown in both response-format sections.
const EXAMPLE_EXERCISE: &str = r#"        {
          "exercise_id": "0001",
          "exercise_name": "3/4 sit-up",
          "sets": 3,
          "reps": "15",
          "rest_seconds": 45
        }"#;

/// Options for [`build_custom_prompt`].
#[derive(Debug, Clone)]
pub struct CustomPromptOptions<'a> {
    pub target_muscle: &'a str,
    pub duration_minutes: u32,
    pub exercises: &'a [Exercise],
    pub days_per_week: usize,
    pub experience_level: ExperienceLevel,
    /// Equipment the user has. Empty means body weight only, with no
    /// filtering of the exercise list.
    pub equipment: &'a [String],
}

impl<'a> CustomPromptOptions<'a> {
    pub fn new(target_muscle: &'a str, duration_minutes: u32, exercises: &'a [Exercise]) -> Self {
        Self {
            target_muscle,
            duration_minutes,
            exercises,
            days_per_week: DAYS_PER_WEEK,
            experience_level: ExperienceLevel::default(),
            equipment: &[],
        }
    }
}

/// Build the standard seven-day prompt.
pub fn build_prompt(target_muscle: &str, duration_minutes: u32, exercises: &[Exercise]) -> String {
    let mut prompt = String::with_capacity(1024 + exercises.len() * 64);

    prompt.push_str(
        "You are a professional fitness trainer. \
         Create a 7-day workout plan based on these requirements:\n\n",
    );
    let _ = writeln!(prompt, "TARGET MUSCLE: {target_muscle}");
    let _ = writeln!(
        prompt,
        "DAILY WORKOUT DURATION: {duration_minutes} minutes per day\n"
    );

    prompt.push_str("AVAILABLE EXERCISES (use ONLY these exercise IDs and names):\n");
    for ex in exercises {
        let _ = writeln!(
            prompt,
            "- ID: {}, Name: \"{}\" (Targets: {})",
            ex.id,
            ex.name,
            ex.focus()
        );
    }

    prompt.push_str(
        "\nINSTRUCTIONS:\n\
         1. Create a 7-day workout plan (Monday to Sunday)\n\
         2. Each day must include 4-6 exercises\n\
         3. ONLY use exercises from the provided list\n\
         4. For each exercise, specify:\n\
         \x20  - exercise_id (from the list)\n\
         \x20  - exercise_name (from the list)\n\
         \x20  - sets (number of sets, 3-5)\n\
         \x20  - reps (string, either number of reps like \"12-15\" or duration like \"30 seconds\")\n\
         \x20  - rest_seconds (number, 30-90 seconds)\n\
         5. Ensure variety across the week\n\
         6. Include progressive overload (increase intensity through the week)\n\n",
    );

    prompt.push_str("RESPONSE FORMAT (STRICT JSON ONLY, no other text):\n");
    push_plan_skeleton(&mut prompt);
    prompt.push_str(",\n");
    let _ = writeln!(
        prompt,
        "  \"total_weekly_minutes\": {},",
        duration_minutes as usize * DAYS_PER_WEEK
    );
    let _ = writeln!(prompt, "  \"target_muscle\": \"{target_muscle}\"");
    prompt.push_str("}\n\nReturn ONLY the JSON object, no other text.\n");

    prompt
}

/// Build a prompt tuned to experience level and available equipment.
///
/// When equipment is given, exercises that need anything else are dropped,
/// except body-weight exercises which are always kept.
pub fn build_custom_prompt(options: &CustomPromptOptions<'_>) -> String {
    let filtered: Vec<&Exercise> = filter_by_equipment(options.exercises, options.equipment);
    let days = options.days_per_week;
    let level = options.experience_level;

    let mut prompt = String::with_capacity(1024 + filtered.len() * 64);

    let _ = writeln!(
        prompt,
        "You are a professional fitness trainer. \
         Create a {days}-day workout plan for a {level} level person.\n"
    );
    let _ = writeln!(prompt, "TARGET MUSCLE: {}", options.target_muscle);
    let _ = writeln!(
        prompt,
        "DAILY WORKOUT DURATION: {} minutes per day",
        options.duration_minutes
    );
    let equipment = if options.equipment.is_empty() {
        "body weight only".to_owned()
    } else {
        options.equipment.join(", ")
    };
    let _ = writeln!(prompt, "AVAILABLE EQUIPMENT: {equipment}\n");

    prompt.push_str("AVAILABLE EXERCISES (use ONLY these):\n");
    for ex in &filtered {
        let _ = writeln!(
            prompt,
            "- ID: {}, Name: \"{}\" (Equipment: {})",
            ex.id, ex.name, ex.equipment
        );
    }

    let _ = write!(
        prompt,
        "\nINSTRUCTIONS:\n\
         1. Create a {days}-day workout plan\n\
         2. Each day must include 4-6 exercises\n\
         3. ONLY use exercises from the provided list\n\
         4. For each exercise, specify:\n\
         \x20  - exercise_id, exercise_name, sets, reps, rest_seconds\n\
         5. Ensure variety and appropriate intensity for {level} level\n\n"
    );

    prompt.push_str("RESPONSE FORMAT (STRICT JSON ONLY):\n");
    push_plan_skeleton(&mut prompt);
    prompt.push_str("\n}\n");

    prompt
}

/// Build whichever prompt the request calls for.
pub fn prompt_for_request(request: &PlanRequest, exercises: &[Exercise]) -> String {
    if request.is_customized() {
        let mut options =
            CustomPromptOptions::new(&request.target_muscle, request.duration_minutes, exercises);
        options.experience_level = request.experience_level.unwrap_or_default();
        options.equipment = &request.equipment;
        build_custom_prompt(&options)
    } else {
        build_prompt(&request.target_muscle, request.duration_minutes, exercises)
    }
}

/// Opening brace and `"plan"` array of the response-format example, without
/// the closing brace of the outer object.
fn push_plan_skeleton(prompt: &mut String) {
    prompt.push_str(
        "{\n  \"plan\": [\n    {\n      \"day\": 1,\n      \"day_name\": \"Monday\",\n      \"exercises\": [\n",
    );
    prompt.push_str(EXAMPLE_EXERCISE);
    prompt.push_str("\n      ]\n    }\n  ]");
}

fn filter_by_equipment<'a>(exercises: &'a [Exercise], equipment: &[String]) -> Vec<&'a Exercise> {
    if equipment.is_empty() {
        return exercises.iter().collect();
    }
    exercises
        .iter()
        .filter(|ex| {
            ex.equipment.eq_ignore_ascii_case(BODY_WEIGHT)
                || equipment.iter().any(|e| e.eq_ignore_ascii_case(&ex.equipment))
        })
        .collect()
}
