use crate::domain::ReportRow;
use chrono::NaiveDate;

pub fn subject(run_date: NaiveDate) -> String {
    format!("Contract Scout Report — {}", run_date.format("%Y-%m-%d"))
}

/// Render the report set as a self-contained HTML document. All interpolated
/// text is escaped; reasoning and requirements come straight from the model.
pub fn render_html(rows: &[ReportRow], min_score: u8, run_date: NaiveDate) -> String {
    let mut body = String::new();

    for row in rows {
        let solicitation = row.solicitation_number.as_deref().unwrap_or("N/A");
        let deadline = fmt_deadline(row.deadline, run_date);
        let value = row.estimated_value.as_deref().unwrap_or("N/A");

        body.push_str(&format!(
            r#"
        <tr style="border-bottom:1px solid #ddd;">
            <td style="padding:12px;vertical-align:top;">
                <strong>{title}</strong><br>
                <span style="color:#555;">Agency:</span> {agency}<br>
                <span style="color:#555;">Solicitation:</span> {solicitation}<br>
                <span style="color:#555;">NAICS:</span> {naics}<br>
                <span style="color:#555;">Est. value:</span> {value}<br>
                <span style="color:#555;">Deadline:</span> {deadline}
            </td>
            <td style="padding:12px;text-align:center;vertical-align:top;font-size:24px;font-weight:bold;color:#2a7ae2;">
                {score}/10
            </td>
            <td style="padding:12px;vertical-align:top;">
                <em>{reasoning}</em><br><br>
                <strong>Key requirements:</strong> {requirements}
            </td>
            <td style="padding:12px;vertical-align:top;text-align:center;">
                <a href="{link}" style="background:#2a7ae2;color:#fff;padding:8px 14px;border-radius:4px;text-decoration:none;">View on SAM.gov</a>
            </td>
        </tr>"#,
            title = escape(&row.title),
            agency = escape(&row.agency),
            solicitation = escape(solicitation),
            naics = escape(&row.naics),
            value = escape(value),
            deadline = deadline,
            score = row.score,
            reasoning = escape(&row.reasoning),
            requirements = escape(&row.key_requirements),
            link = escape(&row.sam_url),
        ));
    }

    format!(
        r#"
    <html><body style="font-family:Arial,sans-serif;color:#333;">
    <h2 style="color:#2a7ae2;">Contract Scout — Top Opportunities</h2>
    <p>Found <strong>{count}</strong> opportunities scoring {min_score}+ out of 10.</p>
    <table style="width:100%;border-collapse:collapse;">
        <tr style="background:#f4f4f4;">
            <th style="padding:10px;text-align:left;">Opportunity</th>
            <th style="padding:10px;">Score</th>
            <th style="padding:10px;text-align:left;">Analysis</th>
            <th style="padding:10px;">Link</th>
        </tr>
        {body}
    </table>
    <p style="margin-top:20px;font-size:12px;color:#999;">
        Generated by Contract Scout on {run_date}
    </p>
    </body></html>"#,
        count = rows.len(),
        min_score = min_score,
        body = body,
        run_date = run_date.format("%Y-%m-%d"),
    )
}

/// Deadline with a colored days-remaining hint, e.g.
/// `Mar 25, 2026 <span ...>(36 days)</span>`. Under 7 days renders red,
/// under 14 amber, otherwise green.
fn fmt_deadline(deadline: Option<NaiveDate>, run_date: NaiveDate) -> String {
    let Some(date) = deadline else {
        return "N/A".to_string();
    };

    let days = (date - run_date).num_days();
    let unit = if days == 1 { "day" } else { "days" };
    let color = if days < 7 {
        "#dc2626"
    } else if days < 14 {
        "#d97706"
    } else {
        "#059669"
    };

    format!(
        "{} <span style='color:{};font-weight:bold'>({} {})</span>",
        date.format("%b %d, %Y"),
        color,
        days,
        unit
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
