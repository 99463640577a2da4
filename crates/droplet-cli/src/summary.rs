use std::path::{Path, PathBuf};

use console::Style;
use droplet_core::clean::CleanedProfile;
use droplet_core::error::Result;
use droplet_core::pipeline::FrameReport;
use droplet_core::tensiometry::{NeedleFit, PhysicalParameters, TensiometryResult};

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    warning: Style,
    error: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            warning: Style::new().yellow(),
            error: Style::new().red(),
            path: Style::new().underlined(),
        }
    }
}

fn print_title(s: &Styles, title: &str) {
    println!();
    println!("  {}", s.title.apply_to(title));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(title.chars().count())));
    println!();
}

pub fn print_clean_summary(path: &Path, raw_points: usize, cleaned: &CleanedProfile) {
    let s = Styles::new();
    print_title(&s, "Contour Cleaning");

    println!("  {:<14}{}", s.label.apply_to("Input"), s.path.apply_to(path.display()));
    println!(
        "  {:<14}{}",
        s.label.apply_to("Points"),
        s.value.apply_to(format!("{raw_points} raw, {} kept", cleaned.profile.len()))
    );
    let apex = cleaned.apex();
    println!(
        "  {:<14}{}",
        s.label.apply_to("Apex"),
        s.value.apply_to(format!("({:.2}, {:.2})", apex.x, apex.y))
    );
    let contacts = cleaned.contact_points;
    println!(
        "  {:<14}{}",
        s.label.apply_to("Contacts"),
        s.value.apply_to(format!(
            "({:.2}, {:.2})  ({:.2}, {:.2})",
            contacts.left.x, contacts.left.y, contacts.right.x, contacts.right.y
        ))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Height"),
        s.value.apply_to(format!("{:.2} px", cleaned.height()))
    );
    for warning in &cleaned.warnings {
        println!("  {:<14}{}", s.label.apply_to("Warning"), s.warning.apply_to(warning));
    }
    println!();
}

pub fn print_angle_table(files: &[PathBuf], reports: &[Result<FrameReport>]) {
    let s = Styles::new();
    print_title(&s, "Contact Angles");

    for (path, report) in files.iter().zip(reports) {
        println!("  {}", s.path.apply_to(path.display()));
        let report = match report {
            Ok(report) => report,
            Err(e) => {
                println!("    {}", s.error.apply_to(e));
                println!();
                continue;
            }
        };
        println!(
            "    {:<16}{:>10}{:>10}{:>12}",
            s.header.apply_to("Method"),
            s.header.apply_to("Left"),
            s.header.apply_to("Right"),
            s.header.apply_to("RMSE (px)")
        );
        for (method, outcome) in &report.outcomes {
            match outcome {
                Ok(fit) => {
                    let angles = fit.angles();
                    let rmse = fit
                        .metrics()
                        .map(|m| format!("{:.3}", m.rmse))
                        .unwrap_or_else(|| "-".into());
                    println!(
                        "    {:<16}{:>10}{:>10}{:>12}",
                        s.method.apply_to(method),
                        s.value.apply_to(format!("{:.2}\u{b0}", angles.left)),
                        s.value.apply_to(format!("{:.2}\u{b0}", angles.right)),
                        rmse
                    );
                }
                Err(e) => println!(
                    "    {:<16}{}",
                    s.method.apply_to(method),
                    s.error.apply_to(e)
                ),
            }
        }
        for warning in &report.cleaned.warnings {
            println!("    {}", s.warning.apply_to(warning));
        }
        println!(
            "    {}",
            s.label.apply_to(format!(
                "cleaning {:.1} ms, fitting {:.1} ms",
                report.timing.cleaning_ms, report.timing.fitting_ms
            ))
        );
        println!();
    }
}

pub fn print_needle_summary(needle: &NeedleFit, physical: &PhysicalParameters) {
    let s = Styles::new();
    print_title(&s, "Needle");

    println!(
        "  {:<14}{}",
        s.label.apply_to("Diameter"),
        s.value.apply_to(format!("{:.3} px", needle.diameter))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Direction"),
        s.value.apply_to(format!("{:.2}\u{b0}", needle.theta.to_degrees()))
    );
    if needle.diameter > 0.0 {
        println!(
            "  {:<14}{}",
            s.label.apply_to("Scale"),
            s.value.apply_to(format!(
                "{:.6} mm/px",
                physical.needle_diameter_mm / needle.diameter
            ))
        );
    }
    let status = if needle.status.is_converged() {
        s.method.apply_to(format!("converged in {}", needle.status.iterations()))
    } else {
        s.warning.apply_to(format!("stopped after {}", needle.status.iterations()))
    };
    println!("  {:<14}{}", s.label.apply_to("Status"), status);
    println!();
}

pub fn print_tension_table(files: &[PathBuf], results: &[Result<TensiometryResult>], interval: f64) {
    let s = Styles::new();
    print_title(&s, "Tensiometry");

    println!(
        "  {:>8}{:>14}{:>12}{:>12}{:>10}{:>10}",
        s.header.apply_to("t (s)"),
        s.header.apply_to("IFT (mN/m)"),
        s.header.apply_to("V (mm\u{b3})"),
        s.header.apply_to("A (mm\u{b2})"),
        s.header.apply_to("Bo"),
        s.header.apply_to("Wo")
    );
    for (i, (path, result)) in files.iter().zip(results).enumerate() {
        let time = i as f64 * interval;
        match result {
            Ok(r) => {
                let q = r.quantities;
                let line = format!(
                    "  {:>8.2}{:>14.3}{:>12.4}{:>12.4}{:>10.4}{:>10.3}",
                    time, q.tension, q.volume, q.area, r.params.bond_number, q.worthington
                );
                if r.status.is_converged() {
                    println!("{}", s.value.apply_to(line));
                } else {
                    println!("{}", s.warning.apply_to(line));
                }
            }
            Err(e) => println!(
                "  {:>8.2}  {} {}",
                time,
                s.path.apply_to(path.display()),
                s.error.apply_to(e)
            ),
        }
    }
    println!();
}
