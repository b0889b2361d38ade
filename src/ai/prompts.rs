// Prompt templates. Every builder is a pure function of its arguments.

/// Formatting rules shared by every plain-text prompt.
const PLAIN_TEXT_RULES: &str = "\
- Use clear numbered headings (1., 2., 3.) instead of ##
- Use bullet points (-) for key points
- Use numbered lists for steps or sequences
- Use CAPITAL LETTERS for important terms instead of **bold**
- Avoid markdown symbols such as #, *, ** and backticks
- Use plain text formatting only";

const NOTES_EXAMPLE: &str = "\
1. MAIN TOPIC
- Key point one
- Key point two
- Important concept

1.1 Sub-topic
- Detailed explanation
- Related information
- Examples

SUMMARY
- Main takeaways
- Key points to remember";

/// Day-by-day study plan, answered as a single JSON object.
pub fn build_study_plan_prompt(
    goal: &str,
    speed: &str,
    hours_per_day: u32,
    duration_days: u32,
) -> String {
    format!(
        r#"Create a detailed, day-by-day study plan for the goal below.
Respond with ONE complete JSON object and nothing else.

Goal: {goal}
Learning speed: {speed}
Hours available per day: {hours}
Total duration: {days} days

The JSON object must have exactly these fields:
- "title": a short, motivating title for the plan (string)
- "totalDays": total number of days, equal to {days} (integer)
- "dailyHours": study hours per day, equal to {hours} (integer)
- "estimatedCompletion": a friendly completion estimate such as "in {days} days" (string)
- "days": an array with one object per day

Each object in "days" must have:
- "day": the day number, starting at 1 (integer)
- "topic": a concise topic for the day (string)
- "time": the estimated time for the day's work, e.g. "{hours} hours" (string)
- "tasks": specific, actionable tasks for the day (array of strings)
- "completed": always false (boolean)

Example:
{{
  "title": "Mastering {goal}: A {days}-Day Journey",
  "totalDays": {days},
  "dailyHours": {hours},
  "estimatedCompletion": "in {days} days",
  "days": [
    {{
      "day": 1,
      "topic": "Introduction to Core Concepts",
      "time": "{hours} hours",
      "tasks": ["Read the introductory chapter", "Complete the warm-up exercises"],
      "completed": false
    }}
  ]
}}"#,
        goal = goal,
        speed = speed,
        hours = hours_per_day,
        days = duration_days,
    )
}

/// Structured notes from arbitrary source text (uploaded documents,
/// existing notes).
pub fn build_notes_prompt(text: &str) -> String {
    format!(
        "Analyze the following text and write structured, hierarchical study notes.\n\
The output must be clean, readable plain text.\n\
\n\
Requirements:\n\
{rules}\n\
- Finish with a SUMMARY section\n\
- Make the notes comprehensive and well organized\n\
\n\
Example format:\n\
{example}\n\
\n\
Text to analyze:\n\
{text}\n",
        rules = PLAIN_TEXT_RULES,
        example = NOTES_EXAMPLE,
        text = text,
    )
}

/// Notes for one day of a study plan.
pub fn build_topic_notes_prompt(topic: &str, day: u32, tasks: &[String]) -> String {
    let task_list = if tasks.is_empty() {
        "No specific tasks provided".to_string()
    } else {
        tasks.join(", ")
    };

    format!(
        "Write comprehensive study notes for the topic: \"{topic}\"\n\
\n\
Day: {day}\n\
Tasks: {tasks}\n\
\n\
Cover, in this order:\n\
1. Key concepts and definitions\n\
2. Important points to remember\n\
3. Examples and applications\n\
4. Study tips and strategies\n\
5. Common questions and answers\n\
6. Summary and key takeaways\n\
\n\
Formatting:\n\
{rules}\n\
\n\
Keep the notes well structured and easy to follow for a student.\n",
        topic = topic,
        day = day,
        tasks = task_list,
        rules = PLAIN_TEXT_RULES,
    )
}

/// Revision notes from a video transcript.
pub fn build_youtube_notes_prompt(transcript: &str) -> String {
    format!(
        "Create comprehensive revision notes from the following YouTube video transcript.\n\
\n\
Requirements:\n\
{rules}\n\
- Quote memorable lines from the video in \"double quotes\"\n\
- Finish with a SUMMARY section\n\
\n\
Example format:\n\
{example}\n\
\n\
Transcript:\n\
{transcript}\n\
\n\
Create clean, readable notes using plain text formatting.\n",
        rules = PLAIN_TEXT_RULES,
        example = NOTES_EXAMPLE,
        transcript = transcript,
    )
}

/// Grounded answer to a question about the user's selected notes.
pub fn build_chat_prompt(notes_context: &str, question: &str) -> String {
    format!(
        "You are a helpful study assistant. Answer using the user's personal notes below.\n\
\n\
USER'S NOTES:\n\
{context}\n\
\n\
USER'S QUESTION: {question}\n\
\n\
INSTRUCTIONS:\n\
1. Base the answer on the notes above\n\
2. If the notes do not cover the question, say so and then give general guidance\n\
3. When you use information from a note, mention which note it came from\n\
4. Keep the answer concise, clear and encouraging\n\
5. Use plain text only: no #, *, ** or other markdown symbols\n\
6. Use bullet points (-) and numbered lists (1., 2., 3.) where they help\n",
        context = notes_context,
        question = question,
    )
}
