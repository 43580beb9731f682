use chrono::{Duration, NaiveDate, NaiveDateTime};
use uuid::Uuid;

use worksim_core::{
    Comment, Dataset, Department, MembershipRole, Organization, Project, ProjectStatus, Section,
    Task, Team, TeamMembership, User, UserRole, validate_dataset,
};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .expect("valid date")
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
}

fn fixture() -> (Dataset, NaiveDateTime) {
    let now = at(28, 12);
    let org = Organization {
        id: Uuid::new_v4(),
        name: "Fixture Org".to_string(),
        created_at: at(1, 9),
    };
    let team = Team {
        id: Uuid::new_v4(),
        name: "Platform Engineering".to_string(),
        description: "Platform work".to_string(),
        organization_id: org.id,
        department: Department::Engineering,
        created_at: at(2, 9),
    };
    let owner = User {
        id: Uuid::new_v4(),
        email: "dana.lee@example.com".to_string(),
        name: "Dana Lee".to_string(),
        role: UserRole::Lead,
        department: Department::Engineering,
        is_active: true,
        created_at: at(3, 9),
    };
    let membership = TeamMembership {
        id: Uuid::new_v4(),
        team_id: team.id,
        user_id: owner.id,
        role: MembershipRole::Lead,
        joined_at: at(3, 10),
    };
    let project = Project {
        id: Uuid::new_v4(),
        name: "Q1 Platform Improvements".to_string(),
        description: "Quarterly work".to_string(),
        team_id: team.id,
        owner_id: owner.id,
        status: ProjectStatus::Active,
        created_at: at(4, 9),
        due_date: Some(at(20, 0).date()),
        archived: false,
    };
    let section = Section {
        id: Uuid::new_v4(),
        name: "In Progress".to_string(),
        project_id: project.id,
        position: 0,
    };
    let task = Task {
        id: Uuid::new_v4(),
        name: "Implement auth endpoint".to_string(),
        description: None,
        project_id: project.id,
        section_id: section.id,
        assignee_id: Some(owner.id),
        created_by_id: owner.id,
        parent_task_id: None,
        due_date: None,
        created_at: at(5, 9),
        completed: true,
        completed_at: Some(at(7, 9)),
        position: 0,
    };
    let comment = Comment {
        id: Uuid::new_v4(),
        task_id: task.id,
        author_id: owner.id,
        text: "Started working on this.".to_string(),
        created_at: at(6, 9),
    };

    let dataset = Dataset {
        organizations: vec![org],
        teams: vec![team],
        users: vec![owner],
        memberships: vec![membership],
        projects: vec![project],
        sections: vec![section],
        tasks: vec![task],
        comments: vec![comment],
        ..Dataset::default()
    };
    (dataset, now)
}

#[test]
fn clean_dataset_has_no_issues() {
    let (dataset, now) = fixture();
    assert!(validate_dataset(&dataset, now).is_empty());
}

#[test]
fn detects_completion_flag_without_timestamp() {
    let (mut dataset, now) = fixture();
    dataset.tasks[0].completed_at = None;
    let issues = validate_dataset(&dataset, now);
    assert!(issues.iter().any(|issue| issue.entity == "task"
        && issue.rule.contains("without completion time")));
}

#[test]
fn detects_dangling_assignee() {
    let (mut dataset, now) = fixture();
    dataset.tasks[0].assignee_id = Some(Uuid::new_v4());
    let issues = validate_dataset(&dataset, now);
    assert!(issues
        .iter()
        .any(|issue| issue.rule.contains("dangling assignee_id")));
}

#[test]
fn detects_comment_outside_task_window() {
    let (mut dataset, now) = fixture();
    dataset.comments[0].created_at = dataset.tasks[0].created_at - Duration::hours(2);
    let issues = validate_dataset(&dataset, now);
    assert!(issues
        .iter()
        .any(|issue| issue.entity == "comment" && issue.rule.contains("before its task")));

    let (mut dataset, now) = fixture();
    dataset.comments[0].created_at =
        dataset.tasks[0].completed_at.expect("completed") + Duration::hours(2);
    let issues = validate_dataset(&dataset, now);
    assert!(issues
        .iter()
        .any(|issue| issue.entity == "comment" && issue.rule.contains("after task completion")));
}

#[test]
fn detects_future_dated_completion() {
    let (mut dataset, now) = fixture();
    dataset.tasks[0].completed_at = Some(now + Duration::days(1));
    let issues = validate_dataset(&dataset, now);
    assert!(issues
        .iter()
        .any(|issue| issue.rule.contains("future-dated completion")));
}

#[test]
fn detects_duplicate_section_positions() {
    let (mut dataset, now) = fixture();
    let mut duplicate = dataset.sections[0].clone();
    duplicate.id = Uuid::new_v4();
    dataset.sections.push(duplicate);
    let issues = validate_dataset(&dataset, now);
    assert!(issues
        .iter()
        .any(|issue| issue.entity == "section" && issue.rule.contains("duplicate position")));
}

#[test]
fn detects_subtask_escaping_parent_project() {
    let (mut dataset, now) = fixture();
    let parent = dataset.tasks[0].clone();
    let mut subtask = parent.clone();
    subtask.id = Uuid::new_v4();
    subtask.parent_task_id = Some(parent.id);
    subtask.project_id = Uuid::new_v4();
    subtask.created_at = parent.created_at + Duration::hours(1);
    subtask.position = 1;
    dataset.tasks.push(subtask);
    let issues = validate_dataset(&dataset, now);
    assert!(issues.iter().any(|issue| issue.rule.contains("dangling project_id")));
    assert!(issues
        .iter()
        .any(|issue| issue.rule.contains("project differs from parent")));
}

#[test]
fn detects_duplicate_emails() {
    let (mut dataset, now) = fixture();
    let mut twin = dataset.users[0].clone();
    twin.id = Uuid::new_v4();
    dataset.users.push(twin);
    let issues = validate_dataset(&dataset, now);
    assert!(issues.iter().any(|issue| issue.rule.contains("duplicate email")));
}
