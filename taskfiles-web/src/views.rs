/// HTML templates
///
/// Rendered with maud, which escapes every spliced value, so task titles and
/// file names coming back from the API are safe to interpolate.

use maud::{html, Markup, DOCTYPE};
use taskfiles_shared::models::{file_metadata::FileMetadata, task_item::TaskItem};

use crate::{config::Frontend, session::Flash};

const STYLES: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #222; background: #f6f7f9; }
header { display: flex; justify-content: space-between; align-items: center; padding: 0.75rem 1.5rem; background: #24292f; color: #fff; }
header a, header button { color: #fff; }
main { max-width: 960px; margin: 1.5rem auto; padding: 0 1rem; }
table { width: 100%; border-collapse: collapse; background: #fff; }
th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #ddd; vertical-align: top; }
form.inline { display: inline; }
.flash { padding: 0.75rem 1rem; margin-bottom: 1rem; border-radius: 4px; }
.flash.success { background: #dafbe1; }
.flash.error { background: #ffebe9; }
.done { text-decoration: line-through; color: #777; }
.card { background: #fff; padding: 1rem; margin-bottom: 1.5rem; border: 1px solid #ddd; }
"#;

fn layout(frontend: Frontend, username: Option<&str>, flash: &Flash, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (frontend.title()) }
                style { (STYLES) }
            }
            body {
                header {
                    a href="/" { strong { (frontend.title()) } }
                    @if let Some(username) = username {
                        span {
                            "Signed in as " (username) " "
                            form.inline method="post" action="/account/logout" {
                                button type="submit" { "Sign out" }
                            }
                        }
                    }
                }
                main {
                    @if let Some(message) = &flash.success {
                        div.flash.success role="status" { (message) }
                    }
                    @if let Some(message) = &flash.error {
                        div.flash.error role="alert" { (message) }
                    }
                    (content)
                }
            }
        }
    }
}

/// Sign-in form; `username` refills the field after a failed attempt
pub fn login_page(frontend: Frontend, flash: &Flash, username: &str) -> Markup {
    layout(
        frontend,
        None,
        flash,
        html! {
            div.card {
                h1 { "Sign in" }
                form method="post" action="/account/login" {
                    p {
                        label for="username" { "Username" }
                        br;
                        input id="username" type="text" name="username" value=(username) autofocus;
                    }
                    p {
                        label for="password" { "Password" }
                        br;
                        input id="password" type="password" name="password";
                    }
                    button type="submit" { "Sign in" }
                }
            }
        },
    )
}

pub fn tasks_page(username: &str, flash: &Flash, tasks: &[TaskItem]) -> Markup {
    layout(
        Frontend::Tasks,
        Some(username),
        flash,
        html! {
            div.card {
                h2 { "New task" }
                form method="post" action="/tasks/create" {
                    p { input type="text" name="title" placeholder="Title" maxlength="200" required; }
                    p { textarea name="description" placeholder="Description" maxlength="1000" {} }
                    p {
                        label { input type="checkbox" name="is_completed" value="on"; " Already done" }
                    }
                    button type="submit" { "Add task" }
                }
            }
            @if tasks.is_empty() {
                p { "No tasks yet." }
            } @else {
                table {
                    thead {
                        tr { th { "Title" } th { "Created" } th { "Completed" } th { "Actions" } }
                    }
                    tbody {
                        @for task in tasks {
                            tr {
                                td {
                                    span.done[task.is_completed] { (task.title) }
                                    @if let Some(description) = &task.description {
                                        br;
                                        small { (description) }
                                    }
                                }
                                td { (task.created_by) br; small { (task.created_at.format("%Y-%m-%d %H:%M")) } }
                                td {
                                    @if let Some(completed_at) = task.completed_at {
                                        (completed_at.format("%Y-%m-%d %H:%M"))
                                    } @else {
                                        "-"
                                    }
                                }
                                td {
                                    form.inline method="post" action=(format!("/tasks/{}/toggle", task.id)) {
                                        button type="submit" {
                                            @if task.is_completed { "Reopen" } @else { "Complete" }
                                        }
                                    }
                                    " "
                                    form.inline method="post" action=(format!("/tasks/{}/delete", task.id)) {
                                        button type="submit" { "Delete" }
                                    }
                                    details {
                                        summary { "Edit" }
                                        form method="post" action=(format!("/tasks/{}/update", task.id)) {
                                            p { input type="text" name="title" value=(task.title) maxlength="200" required; }
                                            p {
                                                textarea name="description" maxlength="1000" {
                                                    (task.description.as_deref().unwrap_or_default())
                                                }
                                            }
                                            p {
                                                label {
                                                    input type="checkbox" name="is_completed" value="on" checked[task.is_completed];
                                                    " Completed"
                                                }
                                            }
                                            button type="submit" { "Save" }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn files_page(username: &str, flash: &Flash, files: &[FileMetadata]) -> Markup {
    layout(
        Frontend::Files,
        Some(username),
        flash,
        html! {
            div.card {
                h2 { "Upload a file" }
                form method="post" action="/files/upload" enctype="multipart/form-data" {
                    input type="file" name="file";
                    " "
                    button type="submit" { "Upload" }
                }
            }
            @if files.is_empty() {
                p { "No files uploaded yet." }
            } @else {
                table {
                    thead {
                        tr { th { "Name" } th { "Size" } th { "Type" } th { "Uploaded" } th { "Actions" } }
                    }
                    tbody {
                        @for file in files {
                            tr {
                                td { a href=(format!("/files/{}/download", file.id)) { (file.file_name) } }
                                td { (format_size(file.file_size)) }
                                td { (file.content_type) }
                                td { (file.uploaded_by) br; small { (file.uploaded_at.format("%Y-%m-%d %H:%M")) } }
                                td {
                                    form.inline method="post" action=(format!("/files/{}/delete", file.id)) {
                                        button type="submit" { "Delete" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

/// Human readable byte count (binary units)
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(title: &str) -> TaskItem {
        TaskItem {
            id: 7,
            title: title.to_string(),
            description: None,
            is_completed: false,
            created_by: "user".to_string(),
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_titles_are_escaped() {
        let page = tasks_page("user", &Flash::default(), &[task("<script>alert(1)</script>")]).into_string();
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("/tasks/7/toggle"));
    }

    #[test]
    fn test_flash_is_rendered() {
        let flash = Flash {
            success: Some("Task created".to_string()),
            error: None,
        };
        let page = tasks_page("user", &flash, &[]).into_string();
        assert!(page.contains("Task created"));
        assert!(page.contains("No tasks yet."));
        assert!(page.contains("Signed in as user"));
    }

    #[test]
    fn test_login_page_keeps_username() {
        let page = login_page(Frontend::Files, &Flash::error("Invalid username or password"), "bob").into_string();
        assert!(page.contains("value=\"bob\""));
        assert!(page.contains("Invalid username or password"));
        assert!(!page.contains("Sign out"));
    }
}
