// Result rendering
// Maps one lookup outcome to a declarative description of the whole result region.
// Hosts replace the region's content with the view; nothing is patched incrementally.

use crate::api::ApiError;
use crate::availability::{AvailabilityResult, CategoryCount, PricingInfo};
use crate::form::FormInput;
use crate::reservation::ReservationForm;
use crate::validation::ValidationError;
use std::fmt::Write;

pub const AVAILABLE_TITLE: &str = "✅ 利用可能な車両";
pub const UNAVAILABLE_TITLE: &str = "❌ 申し訳ございません";
pub const ERROR_TITLE: &str = "⚠️ エラー";
pub const PRICE_TITLE: &str = "💰 レンタル料金";
pub const FULLY_BOOKED_MESSAGE: &str = "ご指定の日時は満車となっております。";
pub const UNAVAILABLE_GUIDANCE: &str =
    "別の日程をお試しいただくか、お電話でお問い合わせください。";
pub const RESERVATION_LABEL: &str = "📝 ご予約はこちら";
pub const AVAILABLE_NOTES: [&str; 3] = [
    "※ 表示料金は全車種共通です",
    "※ 空港送迎無料",
    "※ 奄美空港店ではカード決済可能",
];

const DEFAULT_VEHICLE_ICON: &str = "🚗";

pub fn vehicle_icon(category: &str) -> &'static str {
    match category {
        "軽自動車" => "🚗",
        "一般乗用車" => "🚙",
        _ => DEFAULT_VEHICLE_ICON,
    }
}

/// Yen amount with thousands separators, e.g. `¥12,000`.
pub fn format_yen(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-¥{}", grouped)
    } else {
        format!("¥{}", grouped)
    }
}

// Everything a render cycle can end with
#[derive(Debug)]
pub enum Outcome {
    Response(AvailabilityResult),
    Api(ApiError),
    Validation(ValidationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    Available,
    Unavailable,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleLine {
    pub icon: &'static str,
    pub category: String,
    pub count: i64,
}

impl VehicleLine {
    fn from_count(entry: &CategoryCount) -> Self {
        Self {
            icon: vehicle_icon(&entry.category),
            category: entry.category.clone(),
            count: entry.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceView {
    pub total: String,
    pub breakdown: Vec<String>,
    pub fuel_policy: String,
    pub one_way_bonus: Option<String>,
}

impl PriceView {
    fn from_pricing(pricing: &PricingInfo) -> Self {
        Self {
            total: format!(
                "{}（{}日間）",
                format_yen(pricing.rental_fee),
                pricing.rental_days
            ),
            breakdown: pricing
                .breakdown
                .iter()
                .map(|line| format!("- {}: {}", line.item, format_yen(line.amount)))
                .collect(),
            fuel_policy: format!("⛽ {}", pricing.fuel_policy),
            one_way_bonus: pricing.one_way_bonus().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    VehicleList(Vec<VehicleLine>),
    Pricing(PriceView),
    Paragraphs(Vec<String>),
    Notes(Vec<String>),
    ReservationLink { href: String, label: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub state: DisplayState,
    pub title: String,
    pub blocks: Vec<Block>,
    pub scroll_into_view: bool,
}

pub fn render(
    outcome: &Outcome,
    last_submitted: Option<&FormInput>,
    reservation: &ReservationForm,
) -> ResultView {
    match outcome {
        Outcome::Response(result) => render_response(result, last_submitted, reservation),
        Outcome::Api(error) => render_error(error.user_message()),
        Outcome::Validation(error) => render_error(&error.to_string()),
    }
}

pub fn render_response(
    result: &AvailabilityResult,
    last_submitted: Option<&FormInput>,
    reservation: &ReservationForm,
) -> ResultView {
    let offered = result.offered();
    if offered.is_empty() {
        return render_unavailable(result.message.as_deref());
    }

    let mut blocks = vec![Block::VehicleList(
        offered.into_iter().map(VehicleLine::from_count).collect(),
    )];
    if let Some(pricing) = &result.pricing {
        blocks.push(Block::Pricing(PriceView::from_pricing(pricing)));
    }
    blocks.push(Block::Notes(
        AVAILABLE_NOTES.iter().map(|note| note.to_string()).collect(),
    ));
    if let Some(input) = last_submitted {
        blocks.push(Block::ReservationLink {
            href: reservation.url_for(input).to_string(),
            label: RESERVATION_LABEL.to_string(),
        });
    }

    ResultView {
        state: DisplayState::Available,
        title: AVAILABLE_TITLE.to_string(),
        blocks,
        scroll_into_view: true,
    }
}

pub fn render_unavailable(message: Option<&str>) -> ResultView {
    let message = message
        .filter(|m| !m.is_empty())
        .unwrap_or(FULLY_BOOKED_MESSAGE);
    ResultView {
        state: DisplayState::Unavailable,
        title: UNAVAILABLE_TITLE.to_string(),
        blocks: vec![Block::Paragraphs(vec![
            message.to_string(),
            UNAVAILABLE_GUIDANCE.to_string(),
        ])],
        scroll_into_view: true,
    }
}

pub fn render_error(message: &str) -> ResultView {
    ResultView {
        state: DisplayState::Error,
        title: ERROR_TITLE.to_string(),
        blocks: vec![Block::Paragraphs(vec![message.to_string()])],
        scroll_into_view: true,
    }
}

impl ResultView {
    pub fn css_class(&self) -> &'static str {
        match self.state {
            DisplayState::Available => "result success",
            DisplayState::Unavailable | DisplayState::Error => "result error",
        }
    }

    // Text used when the page has no result region and falls back to an alert
    pub fn primary_message(&self) -> &str {
        self.blocks
            .iter()
            .find_map(|block| match block {
                Block::Paragraphs(lines) => lines.first().map(String::as_str),
                _ => None,
            })
            .unwrap_or(&self.title)
    }

    pub fn vehicle_lines(&self) -> &[VehicleLine] {
        self.blocks
            .iter()
            .find_map(|block| match block {
                Block::VehicleList(lines) => Some(lines.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn reservation_href(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::ReservationLink { href, .. } => Some(href.as_str()),
            _ => None,
        })
    }

    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            r#"<div class="{}"><h3 class="result-title">{}</h3>"#,
            self.css_class(),
            escape_html(&self.title)
        );
        for block in &self.blocks {
            match block {
                Block::VehicleList(lines) => {
                    html.push_str(r#"<ul class="vehicle-list">"#);
                    for line in lines {
                        let _ = write!(
                            html,
                            r#"<li class="vehicle-item">{} <strong>{}:</strong> {}台</li>"#,
                            line.icon,
                            escape_html(&line.category),
                            line.count
                        );
                    }
                    html.push_str("</ul>");
                }
                Block::Pricing(price) => {
                    let _ = write!(
                        html,
                        r#"<div class="price-section"><div class="price-info"><h4>{}</h4><div class="price-total">{}</div>"#,
                        PRICE_TITLE,
                        escape_html(&price.total)
                    );
                    if !price.breakdown.is_empty() {
                        html.push_str(r#"<div class="price-breakdown">"#);
                        for line in &price.breakdown {
                            let _ = write!(
                                html,
                                r#"<div class="breakdown-item">{}</div>"#,
                                escape_html(line)
                            );
                        }
                        html.push_str("</div>");
                    }
                    let _ = write!(
                        html,
                        r#"<div class="fuel-policy">{}</div>"#,
                        escape_html(&price.fuel_policy)
                    );
                    if let Some(bonus) = &price.one_way_bonus {
                        let _ = write!(
                            html,
                            r#"<div class="oneway-bonus">{}</div>"#,
                            escape_html(bonus)
                        );
                    }
                    html.push_str("</div></div>");
                }
                Block::Paragraphs(lines) => {
                    html.push_str(r#"<div class="result-content">"#);
                    for line in lines {
                        let _ = write!(html, "<p>{}</p>", escape_html(line));
                    }
                    html.push_str("</div>");
                }
                Block::Notes(lines) => {
                    let escaped: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
                    let _ = write!(
                        html,
                        r#"<p class="result-note">{}</p>"#,
                        escaped.join("<br>")
                    );
                }
                Block::ReservationLink { href, label } => {
                    let _ = write!(
                        html,
                        r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="reservation-link">{}</a>"#,
                        escape_html(href),
                        escape_html(label)
                    );
                }
            }
        }
        html.push_str("</div>");
        html
    }

    pub fn to_text(&self) -> String {
        let mut lines = vec![self.title.clone()];
        for block in &self.blocks {
            match block {
                Block::VehicleList(vehicles) => lines.extend(vehicles.iter().map(|v| {
                    format!("  {} {}: {}台", v.icon, v.category, v.count)
                })),
                Block::Pricing(price) => {
                    lines.push(format!("{} {}", PRICE_TITLE, price.total));
                    lines.extend(price.breakdown.iter().map(|l| format!("  {}", l)));
                    lines.push(price.fuel_policy.clone());
                    if let Some(bonus) = &price.one_way_bonus {
                        lines.push(bonus.clone());
                    }
                }
                Block::Paragraphs(paragraphs) => lines.extend(paragraphs.iter().cloned()),
                Block::Notes(notes) => lines.extend(notes.iter().cloned()),
                Block::ReservationLink { href, label } => {
                    lines.push(format!("{} {}", label, href))
                }
            }
        }
        lines.join("\n")
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::availability::BreakdownItem;
    use crate::config::ReservationConfig;
    use crate::form::{sample_input, FormField};
    use test_case::test_case;

    fn reservation() -> ReservationForm {
        ReservationForm::new(ReservationConfig::default()).unwrap()
    }

    fn response(json: &str) -> Outcome {
        Outcome::Response(serde_json::from_str(json).unwrap())
    }

    fn pricing() -> PricingInfo {
        PricingInfo {
            rental_fee: 15400,
            rental_days: 3,
            breakdown: vec![
                BreakdownItem {
                    item: "基本料金".to_string(),
                    amount: 12000,
                },
                BreakdownItem {
                    item: "乗り捨て料金".to_string(),
                    amount: 3400,
                },
            ],
            fuel_policy: "ガソリン満タン返し不要".to_string(),
            has_one_way_bonus: true,
            one_way_bonus_message: Some("🎁 乗り捨て特典: 500円引き".to_string()),
        }
    }

    #[test_case(0, "¥0")]
    #[test_case(999, "¥999")]
    #[test_case(1000, "¥1,000")]
    #[test_case(15400, "¥15,400")]
    #[test_case(1234567, "¥1,234,567")]
    #[test_case(-2500, "-¥2,500")]
    fn test_format_yen(amount: i64, expected: &str) {
        assert_eq!(format_yen(amount), expected);
    }

    #[test]
    fn test_zero_count_categories_are_suppressed() {
        let outcome = response(r#"{"success":true,"available":{"軽自動車":2,"一般乗用車":0}}"#);
        let view = render(&outcome, Some(&sample_input()), &reservation());

        assert_eq!(view.state, DisplayState::Available);
        assert_eq!(
            view.vehicle_lines(),
            &[VehicleLine {
                icon: "🚗",
                category: "軽自動車".to_string(),
                count: 2,
            }]
        );
    }

    #[test]
    fn test_all_zero_counts_render_unavailable() {
        let outcome = response(r#"{"success":true,"available":{"軽自動車":0}}"#);
        let view = render(&outcome, Some(&sample_input()), &reservation());

        assert_eq!(view.state, DisplayState::Unavailable);
        assert_eq!(view.title, UNAVAILABLE_TITLE);
        assert_eq!(view.primary_message(), FULLY_BOOKED_MESSAGE);
        assert!(view.reservation_href().is_none());
    }

    #[test]
    fn test_unsuccessful_uses_service_message() {
        let outcome = response(r#"{"success":false,"message":"年末年始は受付停止中です"}"#);
        let view = render(&outcome, None, &reservation());

        assert_eq!(view.state, DisplayState::Unavailable);
        assert_eq!(
            view.blocks,
            vec![Block::Paragraphs(vec![
                "年末年始は受付停止中です".to_string(),
                UNAVAILABLE_GUIDANCE.to_string(),
            ])]
        );
    }

    #[test]
    fn test_only_empty_service_message_falls_back() {
        let blank = render(&response(r#"{"success":false,"message":"  "}"#), None, &reservation());
        assert_eq!(blank.primary_message(), "  ");

        let empty = render(&response(r#"{"success":false,"message":""}"#), None, &reservation());
        assert_eq!(empty.primary_message(), FULLY_BOOKED_MESSAGE);
    }

    #[test]
    fn test_success_without_inventory_is_unavailable() {
        let view = render(&response(r#"{"success":true}"#), None, &reservation());
        assert_eq!(view.state, DisplayState::Unavailable);
    }

    #[test]
    fn test_available_with_pricing_and_link() {
        let result = AvailabilityResult {
            success: true,
            available: Some(
                [("一般乗用車", 1), ("キャンピングカー", 3)]
                    .into_iter()
                    .collect(),
            ),
            pricing: Some(pricing()),
            message: None,
        };
        let input = sample_input();
        let form = reservation();
        let view = render(&Outcome::Response(result), Some(&input), &form);

        assert_eq!(view.state, DisplayState::Available);
        assert_eq!(view.title, AVAILABLE_TITLE);
        let icons: Vec<&str> = view.vehicle_lines().iter().map(|l| l.icon).collect();
        assert_eq!(icons, vec!["🚙", "🚗"]);

        let price = view
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Pricing(p) => Some(p),
                _ => None,
            })
            .unwrap();
        assert_eq!(price.total, "¥15,400（3日間）");
        assert_eq!(
            price.breakdown,
            vec!["- 基本料金: ¥12,000", "- 乗り捨て料金: ¥3,400"]
        );
        assert_eq!(price.fuel_policy, "⛽ ガソリン満タン返し不要");
        assert_eq!(
            price.one_way_bonus.as_deref(),
            Some("🎁 乗り捨て特典: 500円引き")
        );

        let expected_href = form.url_for(&input).to_string();
        assert_eq!(view.reservation_href(), Some(expected_href.as_str()));
        assert!(matches!(view.blocks.last(), Some(Block::ReservationLink { .. })));
    }

    #[test]
    fn test_available_without_submitted_input_has_no_link() {
        let outcome = response(r#"{"success":true,"available":{"軽自動車":1}}"#);
        let view = render(&outcome, None, &reservation());
        assert_eq!(view.state, DisplayState::Available);
        assert!(view.reservation_href().is_none());
    }

    #[test]
    fn test_api_errors_share_generic_message() {
        let view = render(
            &Outcome::Api(ApiError::HttpStatus(500)),
            Some(&sample_input()),
            &reservation(),
        );
        assert_eq!(view.state, DisplayState::Error);
        assert_eq!(view.title, ERROR_TITLE);
        assert_eq!(view.primary_message(), crate::api::GENERIC_API_ERROR_MESSAGE);
        assert!(view.scroll_into_view);
    }

    #[test]
    fn test_validation_error_message_is_shown() {
        let view = render(
            &Outcome::Validation(ValidationError::MissingField(FormField::PickupBranch)),
            None,
            &reservation(),
        );
        assert_eq!(view.state, DisplayState::Error);
        assert_eq!(view.primary_message(), "すべての項目を入力してください。");
    }

    #[test]
    fn test_render_is_idempotent() {
        let json = r#"{"success":true,"available":{"軽自動車":2},"pricing":{"rentalFee":8000,"rentalDays":1,"fuelPolicy":"満タン返し"}}"#;
        let input = sample_input();
        let form = reservation();
        let first = render(&response(json), Some(&input), &form);
        let second = render(&response(json), Some(&input), &form);
        assert_eq!(first, second);
        assert_eq!(first.to_html(), second.to_html());
    }

    #[test]
    fn test_html_escapes_service_text() {
        let outcome = response(r#"{"success":false,"message":"<script>alert(1)</script> & more"}"#);
        let html = render(&outcome, None, &reservation()).to_html();

        assert!(html.starts_with(r#"<div class="result error">"#));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; more"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_html_for_available_result() {
        let result = AvailabilityResult {
            success: true,
            available: Some([("軽自動車", 2)].into_iter().collect()),
            pricing: Some(pricing()),
            message: None,
        };
        let html = render(&Outcome::Response(result), Some(&sample_input()), &reservation())
            .to_html();

        assert!(html.starts_with(r#"<div class="result success">"#));
        assert!(html.contains(r#"<li class="vehicle-item">🚗 <strong>軽自動車:</strong> 2台</li>"#));
        assert!(html.contains(r#"<div class="price-total">¥15,400（3日間）</div>"#));
        assert!(html.contains(r#"<div class="oneway-bonus">"#));
        assert!(html.contains("※ 空港送迎無料<br>※ 奄美空港店ではカード決済可能"));
        assert!(html.contains(r#"rel="noopener noreferrer" class="reservation-link">📝 ご予約はこちら</a>"#));
        // Query separators in the link are escaped as attribute text
        assert!(html.contains("?usp=pp_url&amp;entry.1435092602=2030-06-01"));
    }

    #[test]
    fn test_text_rendering() {
        let outcome = response(r#"{"success":true,"available":{"一般乗用車":4}}"#);
        let text = render(&outcome, None, &reservation()).to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], AVAILABLE_TITLE);
        assert_eq!(lines[1], "  🚙 一般乗用車: 4台");
        assert_eq!(lines.last(), Some(&AVAILABLE_NOTES[2]));
    }
}
