//! HTML pages
//!
//! Plain `format!` rendering. Every user-supplied value goes through
//! [`escape`] before it reaches the markup.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;

use crate::flash::{Flash, FlashKind};
use crate::models::course::REQUIRED_FIELDS;
use crate::models::Course;

const STYLE: &str = "body{font-family:sans-serif;max-width:960px;margin:2rem auto;padding:0 1rem}\
table{border-collapse:collapse;width:100%}th,td{border:1px solid #ccc;padding:.4rem;text-align:left}\
.flash{padding:.6rem;margin:1rem 0;border-radius:4px}.flash-success{background:#e6f4ea}\
.flash-error{background:#fdecea}label{display:block;margin-top:.6rem}";

fn layout(title: &str, flash: Option<&Flash>, content: &str) -> String {
    let notice = flash.map(render_flash).unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <nav><a href=\"/\">Home</a> | <a href=\"/catalog\">Catalog</a> | \
         <a href=\"/add_course\">Add course</a></nav>\n{notice}{content}\n</body>\n</html>\n",
        title = escape(title),
    )
}

fn render_flash(flash: &Flash) -> String {
    let class = match flash.kind {
        FlashKind::Success => "flash flash-success",
        FlashKind::Error => "flash flash-error",
    };
    format!("<div class=\"{}\">{}</div>\n", class, escape(&flash.message))
}

pub fn home(flash: Option<&Flash>) -> String {
    layout(
        "Course Catalog",
        flash,
        "<h1>Course Catalog</h1>\n<p>Browse the <a href=\"/catalog\">catalog</a> \
         or <a href=\"/add_course\">add a course</a>.</p>",
    )
}

pub fn catalog(courses: &[Course], flash: Option<&Flash>) -> String {
    let mut content = String::from("<h1>Course Catalog</h1>\n");

    if courses.is_empty() {
        content.push_str("<p>No courses yet.</p>");
        return layout("Course Catalog", flash, &content);
    }

    content.push_str(
        "<table>\n<tr><th>Code</th><th>Name</th><th>Instructor</th><th>Semester</th>\
         <th>Schedule</th><th>Classroom</th></tr>\n",
    );
    for course in courses {
        let _ = writeln!(
            content,
            "<tr><td><a href=\"/course/{}\">{}</a></td><td>{}</td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td></tr>",
            encode_path_segment(&course.code),
            escape(&course.code),
            escape(&course.name),
            escape(&course.instructor),
            escape(&course.semester),
            escape(&course.schedule),
            escape(&course.classroom),
        );
    }
    content.push_str("</table>");

    layout("Course Catalog", flash, &content)
}

/// Add-course form, refilled with `values` after a failed submission
pub fn add_course_form<'a>(
    values: impl Fn(&str) -> Option<&'a str>,
    flash: Option<&Flash>,
) -> String {
    let mut content = String::from(
        "<h1>Add a course</h1>\n<form method=\"post\" action=\"/add_course\">\n",
    );

    for name in REQUIRED_FIELDS.iter().copied().chain(["prerequisites"]) {
        let value = values(name).unwrap_or("");
        if name == "description" {
            let _ = writeln!(
                content,
                "<label>{label}<textarea name=\"{name}\">{value}</textarea></label>",
                label = field_label(name),
                value = escape(value),
            );
        } else {
            let _ = writeln!(
                content,
                "<label>{label}<input type=\"text\" name=\"{name}\" value=\"{value}\"></label>",
                label = field_label(name),
                value = escape(value),
            );
        }
    }

    content.push_str("<button type=\"submit\">Add course</button>\n</form>");
    layout("Add a course", flash, &content)
}

pub fn course_details(course: &Course, flash: Option<&Flash>) -> String {
    let rows = [
        ("Code", &course.code),
        ("Instructor", &course.instructor),
        ("Semester", &course.semester),
        ("Schedule", &course.schedule),
        ("Classroom", &course.classroom),
        ("Prerequisites", &course.prerequisites),
        ("Grading", &course.grading),
        ("Description", &course.description),
    ];

    let mut content = format!("<h1>{}</h1>\n<table>\n", escape(&course.name));
    for (label, value) in rows {
        let _ = writeln!(content, "<tr><th>{}</th><td>{}</td></tr>", label, escape(value));
    }
    content.push_str("</table>\n<p><a href=\"/catalog\">Back to catalog</a></p>");

    layout(&course.name, flash, &content)
}

pub fn error_page(message: &str) -> String {
    layout(
        "Something went wrong",
        Some(&Flash::error(message)),
        "<h1>Something went wrong</h1>\n<p><a href=\"/\">Back to home</a></p>",
    )
}

fn field_label(name: &str) -> &'static str {
    match name {
        "code" => "Course code",
        "name" => "Course name",
        "instructor" => "Instructor",
        "semester" => "Semester",
        "schedule" => "Schedule",
        "classroom" => "Classroom",
        "grading" => "Grading",
        "description" => "Description",
        "prerequisites" => "Prerequisites",
        _ => "",
    }
}

/// Escape text for HTML element content and quoted attributes
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Characters escaped in a single URL path segment (RFC 3986 unreserved kept)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode_path_segment(s: &str) -> String {
    utf8_percent_encode(s, PATH_SEGMENT).to_string()
}
