//! `settings.gradle.kts` generation.

use crate::kts::{KtsWriter, string_literal};
use crate::project::Project;
use pom2gradle_maven::Repository;
use std::collections::HashSet;

/// Hosts serving Maven Central.
const CENTRAL_HOSTS: &[&str] = &["repo1.maven.org", "repo.maven.apache.org"];

fn is_central(repository: &Repository) -> bool {
    CENTRAL_HOSTS.iter().any(|host| repository.url.contains(host))
        || repository.id.to_ascii_lowercase().contains("central")
}

/// Non-central repositories of the whole tree, deduplicated by URL.
pub fn custom_repositories<'a>(project: &Project<'a>) -> Vec<&'a Repository> {
    let tree = project.tree;
    let mut seen = HashSet::new();
    tree.iter()
        .flat_map(|id| tree.module(id).repositories.iter())
        .filter(|repo| !is_central(repo))
        .filter(|repo| seen.insert(repo.url.trim_end_matches('/').to_string()))
        .collect()
}

fn write_repository(w: &mut KtsWriter, repository: &Repository) {
    w.open("maven");
    w.line(format!("name = {}", string_literal(&repository.id)));
    w.line(format!(
        "url = uri({})",
        string_literal(repository.url.trim_end_matches('/'))
    ));
    w.close();
}

pub fn generate_settings(project: &Project<'_>) -> String {
    let repositories = custom_repositories(project);
    let tree = project.tree;
    let mut w = KtsWriter::default();
    w.comment("Generated by pom2gradle.");
    w.blank();

    if project.is_multi_module() || !repositories.is_empty() {
        w.open("pluginManagement");
        w.open("repositories");
        w.line("mavenCentral()");
        w.line("gradlePluginPortal()");
        for repository in &repositories {
            write_repository(&mut w, repository);
        }
        w.close();
        w.close();
        w.blank();
    }

    if !repositories.is_empty() {
        w.open("dependencyResolutionManagement");
        w.open("repositories");
        w.line("mavenCentral()");
        for repository in &repositories {
            write_repository(&mut w, repository);
        }
        w.close();
        w.close();
        w.blank();
    }

    let root_name = project
        .root()
        .map_or(tree.module(tree.root()).artifact_id.as_str(), |plan| plan.name());
    w.line(format!("rootProject.name = {}", string_literal(root_name)));
    w.blank();

    let mut relocated = Vec::new();
    for plan in project.plans().iter().filter(|p| !p.view.module.is_root) {
        let path = plan.gradle_path();
        w.line(format!("include({})", string_literal(path.trim_start_matches(':'))));
        if plan.view.module.is_outside_root() {
            relocated.push((path, plan.view.module.source_dir.clone()));
        }
    }
    if !relocated.is_empty() {
        w.blank();
        for (path, dir) in relocated {
            w.line(format!(
                "project({}).projectDir = file({})",
                string_literal(&path),
                string_literal(&dir)
            ));
        }
    }
    w.finish()
}
