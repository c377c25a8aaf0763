use recast_core::settings::LlmSettings;

pub const ANALYSIS_TAG: &str = "JSON_out";
pub const VERDICT_TAG: &str = "response";

pub fn analysis_prompt(llm: &LlmSettings, essay_text: &str) -> String {
    let target = &llm.target_language;
    let learner = &llm.learner_language;
    format!(
        "You assist the teacher of a beginner {target} course. A student whose first language \
is {learner} wrote the essay below. Find the clear errors in it, and for each one prepare \
feedback that lets the student fix the mistake on their own, one step at a time.

Return a JSON array with one object per error. Each object has exactly these string fields:

error_orig: the original sentence containing the error.
error_corrected: that sentence with only this error corrected.
line_1: first message to the student. Say which sentence holds the error, give a hint about \
what is wrong, and ask the student to fix it.
response_1_correct: shown if the student fixes it on the first try. Encouraging, with a short \
summary of the correction.
response_1_incorrect: shown after a failed first try. Give a bit more information and ask again.
response_2_correct: shown if the student fixes it on the second try. Encouraging, with a \
summary of the error and the correction.
response_2_incorrect: shown after a failed second try. Explain the error and the correction \
in detail.
explanation: a final explanation of the correction for a student who could not self-correct.

If one sentence contains several errors, produce a separate object for each. If there are no \
errors, return an empty array. Write the feedback in {learner}. Put the JSON between \
<{ANALYSIS_TAG}> tags and output nothing else inside them.

<essay_text>
{essay_text}
</essay_text>
"
    )
}

pub fn verdict_prompt(original_sentence: &str, target_correction: &str, attempt_text: &str) -> String {
    format!(
        "You assist a language teacher. Below are a sentence containing an error, the target \
correction for it, and a student's attempt at the correction. Decide whether the student \
corrected the error. Answer with a single \"yes\" or \"no\" between <{VERDICT_TAG}> tags.

<error_sentence>
{original_sentence}
</error_sentence>

<target_correction>
{target_correction}
</target_correction>

<student_correction>
{attempt_text}
</student_correction>
"
    )
}
