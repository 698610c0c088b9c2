//! Feedback report rendering
//!
//! Renders both delivery bodies from the accumulated per-question
//! results: a plain-text version and an HTML version from a fixed
//! template. Questions are numbered 1..N in evaluation order.

use crate::types::QuestionResult;

/// Rendered report, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportBundle {
    /// Mail subject line
    pub subject: String,
    /// Plain-text body
    pub plain: String,
    /// HTML body
    pub html: String,
}

/// Render the full report for one completed run.
#[must_use]
pub fn render_report(
    student_name: &str,
    test_title: &str,
    overall_pct: f64,
    results: &[QuestionResult],
) -> ReportBundle {
    ReportBundle {
        subject: format!("Assessment Feedback - {test_title}"),
        plain: render_plain(student_name, test_title, overall_pct, results),
        html: render_html(student_name, test_title, overall_pct, results),
    }
}

fn render_plain(
    student_name: &str,
    test_title: &str,
    overall_pct: f64,
    results: &[QuestionResult],
) -> String {
    let mut body = format!(
        "Dear {student_name},\n\nHere is your assessment feedback for test: {test_title}\n\n"
    );
    for (idx, result) in results.iter().enumerate() {
        body.push_str(&format!(
            "Q{n}: {question}\nA: {answer}\nScore: {score}/100\nFeedback: {feedback}\n\n",
            n = idx + 1,
            question = result.question_text,
            answer = result.student_answer,
            score = result.final_pct,
            feedback = result.feedback,
        ));
    }
    body.push_str(&format!(
        "\nOverall Score: {overall_pct}/100\n\nBest regards,\nAssessment Team"
    ));
    body
}

fn render_html(
    student_name: &str,
    test_title: &str,
    overall_pct: f64,
    results: &[QuestionResult],
) -> String {
    let question_blocks: String = results
        .iter()
        .enumerate()
        .map(|(idx, result)| {
            format!(
                r#"<div class="question-block">
  <p class="question-title">Q{n}: {question}</p>
  <p><strong>Your Answer:</strong> {answer}</p>
  <p><strong>Score:</strong> <span class="score">{score}/100</span></p>
  <p><strong>Feedback:</strong></p>
  <div class="feedback-box">{feedback}</div>
</div>
"#,
                n = idx + 1,
                question = escape_html(&result.question_text),
                answer = escape_html(&result.student_answer),
                score = result.final_pct,
                feedback = escape_html(&result.feedback).replace('\n', "<br/>"),
            )
        })
        .collect();

    HTML_TEMPLATE
        .replace("{{ STUDENT_NAME }}", &escape_html(student_name))
        .replace("{{ TEST_TITLE }}", &escape_html(test_title))
        .replace("{{ OVERALL_SCORE }}", &overall_pct.to_string())
        .replace("{{ QUESTION_FEEDBACK_HTML }}", &question_blocks)
}

/// Minimal HTML entity escaping for interpolated values.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <title>Assessment Feedback</title>
  <style>
    body { font-family: -apple-system, "Segoe UI", Roboto, Arial, sans-serif; background-color: #f4f4f4; margin: 0; }
    .container { max-width: 600px; margin: 20px auto; background-color: #ffffff; border-radius: 8px; overflow: hidden; }
    .header { background-color: #007bff; color: #ffffff; padding: 20px; text-align: center; }
    .content { padding: 20px; color: #333333; }
    .overall-score { text-align: center; margin: 20px 0; padding: 15px; border: 2px solid #28a745; background-color: #e9f7ef; border-radius: 5px; }
    .overall-score p { font-size: 2em; font-weight: bold; color: #28a745; margin: 0; }
    .question-block { margin-bottom: 25px; padding: 15px; border: 1px solid #e0e0e0; border-radius: 5px; }
    .question-title { font-size: 1.1em; font-weight: 600; }
    .score { color: #007bff; font-weight: bold; }
    .feedback-box { margin-top: 10px; padding: 12px; background-color: #f8f9fa; border-left: 4px solid #007bff; border-radius: 3px; white-space: pre-wrap; }
    .footer { padding: 20px; text-align: center; font-size: 0.8em; color: #999999; border-top: 1px solid #eeeeee; }
  </style>
</head>
<body>
  <div class="container">
    <div class="header">
      <h1>Assessment Feedback: {{ TEST_TITLE }}</h1>
    </div>
    <div class="content">
      <p>Dear {{ STUDENT_NAME }},</p>
      <p>Please find your detailed assessment feedback below:</p>
      <div class="overall-score">
        <h2>Overall Score</h2>
        <p>{{ OVERALL_SCORE }}/100</p>
      </div>
      {{ QUESTION_FEEDBACK_HTML }}
      <p>We encourage you to review the suggested improvements to enhance your understanding of the material.</p>
    </div>
    <div class="footer">
      Best regards,<br>
      The Assessment Team
    </div>
  </div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScoreBreakdown;

    fn result(n: u32, score: f64) -> QuestionResult {
        QuestionResult {
            question_id: format!("q{n}"),
            question_text: format!("Question {n}?"),
            student_answer: format!("Answer {n}"),
            final_pct: score,
            breakdown: ScoreBreakdown {
                embedding_pct: score,
                cross_pct: score,
                negation_penalty: 0.0,
                final_pct: score,
                reason: None,
            },
            feedback: "Positive: solid.\nImprovement: detail.\nSuggestion: practice.".to_string(),
        }
    }

    #[test]
    fn plain_body_numbers_questions_in_order() {
        let report = render_report("Ada", "Memory Basics", 75.5, &[result(1, 80.0), result(2, 71.0)]);
        assert!(report.plain.contains("Dear Ada,"));
        assert!(report.plain.contains("Q1: Question 1?"));
        assert!(report.plain.contains("Q2: Question 2?"));
        assert!(report.plain.contains("Score: 80/100"));
        assert!(report.plain.contains("Overall Score: 75.5/100"));
        let q1 = report.plain.find("Q1:").unwrap();
        let q2 = report.plain.find("Q2:").unwrap();
        assert!(q1 < q2);
    }

    #[test]
    fn html_body_carries_scores_and_breaks_feedback_lines() {
        let report = render_report("Ada", "Memory Basics", 100.0, &[result(1, 100.0)]);
        assert!(report.html.contains("Assessment Feedback: Memory Basics"));
        assert!(report.html.contains("100/100"));
        assert!(report.html.contains("Positive: solid.<br/>Improvement: detail."));
    }

    #[test]
    fn interpolated_values_are_escaped() {
        let mut r = result(1, 50.0);
        r.student_answer = "<script>alert(1)</script>".to_string();
        let report = render_report("A & B", "T<itle>", 50.0, &[r]);
        assert!(!report.html.contains("<script>"));
        assert!(report.html.contains("&lt;script&gt;"));
        assert!(report.html.contains("A &amp; B"));
    }

    #[test]
    fn subject_names_the_test() {
        let report = render_report("Ada", "Memory Basics", 0.0, &[]);
        assert_eq!(report.subject, "Assessment Feedback - Memory Basics");
    }
}
