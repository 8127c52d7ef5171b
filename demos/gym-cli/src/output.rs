//! Styled terminal output

use console::style;
use gymdesk_client::types::{ClientsPage, Gym, GymsPage, Membership, TrainersPage};
use gymdesk_client::{AuthUser, Role};

/// Display the signed-in account
pub fn display_signed_in(user: &AuthUser, restored: bool) {
    let how = if restored { "restored session" } else { "signed in" };
    println!(
        "{} {} {}",
        style(format!("{how} |")).dim(),
        style(&user.email).cyan(),
        style(format!("({})", user.role)).dim()
    );
    println!();
}

/// Pretty-print any JSON payload
pub fn display_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("{value}"),
    }
}

pub fn display_clients(page: &ClientsPage) {
    for client in &page.clients {
        println!(
            "  {:<28} {:<32} {}",
            client.full_name.as_deref().unwrap_or("-"),
            style(client.email.as_deref().unwrap_or("-")).dim(),
            client.membership_status.as_deref().unwrap_or("")
        );
    }
    display_page_footer(page.current_page, page.total_pages, page.total_clients, "clients");
}

pub fn display_trainers(page: &TrainersPage) {
    for trainer in &page.trainers {
        println!(
            "  {:<28} {:<32} {}",
            trainer.full_name,
            style(&trainer.email).dim(),
            trainer.specialization.as_deref().unwrap_or("")
        );
    }
    display_page_footer(
        page.current_page,
        page.total_pages,
        page.total_trainers,
        "trainers",
    );
}

pub fn display_gyms(page: &GymsPage) {
    for gym in &page.gyms {
        display_gym_row(gym);
    }
    display_page_footer(page.current_page, page.total_pages, page.total_gyms, "gyms");
}

fn display_gym_row(gym: &Gym) {
    println!(
        "  {:<10} {:<28} {:<10} {:?}",
        style(gym.id.as_str()).dim(),
        gym.gym_name,
        format!("{:?}", gym.approval_status),
        gym.subscription_status
    );
}

pub fn display_membership(membership: Option<&Membership>) {
    match membership {
        Some(m) => println!(
            "  {} {}",
            style(&m.plan_name).cyan(),
            style(match m.days_left {
                Some(days) => format!("({days} days left)"),
                None => String::new(),
            })
            .dim()
        ),
        None => println!("  {}", style("no membership yet").dim()),
    }
}

fn display_page_footer(current: u32, total_pages: u32, total: u64, noun: &str) {
    println!();
    println!(
        "{}",
        style(format!("page {current}/{total_pages} | {total} {noun}")).dim()
    );
}

pub fn display_wrong_role(command: &str, role: Role) {
    println!(
        "{} {}",
        style("✗").red(),
        style(format!("`{command}` is not available to the {role} role")).red()
    );
}

pub fn display_error(message: &str) {
    println!("{} {}", style("✗").red(), style(message).red());
}
