// SPDX-License-Identifier: GPL-3.0-or-later
// vaultside - Breadcrumb trail for the current vault page

/// One crumb in the navigation trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub name: String,
    pub path: String,
}

/// Home page every trail starts from.
pub const HOME_PAGE: &str = "index.md";

/// Build the crumb trail for a vault page path. The `.md` suffix is
/// dropped and the remainder split on path separators and dashes into
/// cumulative sub-paths, Home first.
pub fn breadcrumbs(current_page: &str) -> Vec<Crumb> {
    let home = Crumb {
        name: "Home".to_string(),
        path: HOME_PAGE.to_string(),
    };
    if current_page == HOME_PAGE {
        return vec![home];
    }

    let page_name = current_page.strip_suffix(".md").unwrap_or(current_page);
    let mut crumbs = vec![home];
    let mut current_path = String::new();
    for part in page_name
        .split(|c| c == '/' || c == '\\' || c == '-')
        .filter(|p| !p.trim().is_empty())
    {
        if !current_path.is_empty() {
            current_path.push('/');
        }
        current_path.push_str(part);
        crumbs.push(Crumb {
            name: part.to_string(),
            path: format!("{}.md", current_path),
        });
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn home_page_is_a_single_crumb() {
        let crumbs = breadcrumbs("index.md");
        assert_eq!(crumbs.len(), 1);
        assert_eq!(crumbs[0].path, "index.md");
    }

    #[test]
    fn nested_page_builds_cumulative_paths() {
        let crumbs = breadcrumbs("projects/rust/notes.md");
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "index.md",
                "projects.md",
                "projects/rust.md",
                "projects/rust/notes.md"
            ]
        );
        assert_eq!(crumbs[1].name, "projects");
    }

    #[test]
    fn dashes_split_like_separators() {
        let crumbs = breadcrumbs("daily-2026.md");
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["index.md", "daily.md", "daily/2026.md"]);
    }

    #[test]
    fn empty_segments_are_skipped() {
        let crumbs = breadcrumbs("a//b.md");
        assert_eq!(crumbs.len(), 3);
    }
}
