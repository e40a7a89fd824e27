//! Objective-aware result selection
//!
//! Each campaign objective maps to an ordered list of candidate action
//! types; the first candidate present in the row's action breakdown with a
//! value above zero is the row's "result". Reach-family objectives short-
//! circuit to the reach metric and never consult actions. Cost per result
//! prefers the platform-computed cost entry for the chosen action type and
//! falls back to spend / result.

use admx_common::model::ActionEntry;
use admx_common::numeric::{finite, round2, safe_div};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Objective families, collapsing the platform's legacy and
/// outcome-prefixed objective spellings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveFamily {
    Awareness,
    Traffic,
    Engagement,
    Messages,
    Leads,
    Sales,
    AppPromotion,
    VideoViews,
    Unknown,
}

impl ObjectiveFamily {
    /// Classify a raw platform objective string
    pub fn classify(objective: Option<&str>) -> Self {
        let Some(raw) = objective else {
            return ObjectiveFamily::Unknown;
        };
        match raw.to_ascii_uppercase().as_str() {
            "REACH" | "BRAND_AWARENESS" | "OUTCOME_AWARENESS" => ObjectiveFamily::Awareness,
            "LINK_CLICKS" | "TRAFFIC" | "OUTCOME_TRAFFIC" => ObjectiveFamily::Traffic,
            "POST_ENGAGEMENT" | "PAGE_LIKES" | "EVENT_RESPONSES" | "OUTCOME_ENGAGEMENT" => {
                ObjectiveFamily::Engagement
            }
            "MESSAGES" => ObjectiveFamily::Messages,
            "LEAD_GENERATION" | "OUTCOME_LEADS" => ObjectiveFamily::Leads,
            "CONVERSIONS" | "PRODUCT_CATALOG_SALES" | "OUTCOME_SALES" => ObjectiveFamily::Sales,
            "APP_INSTALLS" | "OUTCOME_APP_PROMOTION" => ObjectiveFamily::AppPromotion,
            "VIDEO_VIEWS" => ObjectiveFamily::VideoViews,
            _ => ObjectiveFamily::Unknown,
        }
    }
}

/// One candidate action type with its Vietnamese display label
struct Candidate {
    action_type: &'static str,
    label: &'static str,
}

/// Ordered candidate tables per family. Order matters: messaging prefers
/// a started conversation over a first reply over generic engagement.
static CANDIDATES: Lazy<HashMap<ObjectiveFamily, Vec<Candidate>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        ObjectiveFamily::Traffic,
        vec![
            Candidate { action_type: "link_click", label: "Lượt nhấp vào liên kết" },
            Candidate { action_type: "landing_page_view", label: "Lượt xem trang đích" },
        ],
    );
    map.insert(
        ObjectiveFamily::Messages,
        vec![
            Candidate {
                action_type: "onsite_conversion.messaging_conversation_started_7d",
                label: "Cuộc trò chuyện bắt đầu",
            },
            Candidate {
                action_type: "onsite_conversion.messaging_first_reply",
                label: "Phản hồi đầu tiên",
            },
            Candidate { action_type: "post_engagement", label: "Lượt tương tác với bài viết" },
            Candidate { action_type: "page_engagement", label: "Lượt tương tác với trang" },
        ],
    );
    map.insert(
        ObjectiveFamily::Engagement,
        vec![
            Candidate {
                action_type: "onsite_conversion.messaging_conversation_started_7d",
                label: "Cuộc trò chuyện bắt đầu",
            },
            Candidate { action_type: "post_engagement", label: "Lượt tương tác với bài viết" },
            Candidate { action_type: "page_engagement", label: "Lượt tương tác với trang" },
        ],
    );
    map.insert(
        ObjectiveFamily::Leads,
        vec![
            Candidate { action_type: "lead", label: "Khách hàng tiềm năng" },
            Candidate {
                action_type: "onsite_conversion.lead_grouped",
                label: "Khách hàng tiềm năng",
            },
        ],
    );
    map.insert(
        ObjectiveFamily::Sales,
        vec![
            Candidate { action_type: "purchase", label: "Lượt mua" },
            Candidate { action_type: "omni_purchase", label: "Lượt mua" },
            Candidate { action_type: "onsite_conversion.purchase", label: "Lượt mua" },
        ],
    );
    map.insert(
        ObjectiveFamily::AppPromotion,
        vec![
            Candidate { action_type: "app_install", label: "Lượt cài đặt ứng dụng" },
            Candidate { action_type: "omni_app_install", label: "Lượt cài đặt ứng dụng" },
        ],
    );
    map.insert(
        ObjectiveFamily::VideoViews,
        vec![Candidate { action_type: "video_view", label: "Lượt xem video" }],
    );
    // Unknown objectives fall back to the generic click/engagement pair
    map.insert(
        ObjectiveFamily::Unknown,
        vec![
            Candidate { action_type: "link_click", label: "Lượt nhấp vào liên kết" },
            Candidate { action_type: "post_engagement", label: "Lượt tương tác với bài viết" },
        ],
    );
    map
});

const REACH_LABEL: &str = "Người tiếp cận";

/// The chosen result metric for one row
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedResult {
    pub count: f64,
    pub label: &'static str,
    /// Chosen action type; None for reach-family results
    pub action_type: Option<&'static str>,
    pub cost_per_result: f64,
}

fn action_value(actions: &[ActionEntry], action_type: &str) -> Option<f64> {
    actions
        .iter()
        .find(|a| a.action_type == action_type)
        .map(|a| finite(a.value))
}

/// Derive the objective-appropriate result and its cost
pub fn derive_result(
    objective: Option<&str>,
    actions: &[ActionEntry],
    cost_per_action: &[ActionEntry],
    spend: f64,
    reach: i64,
) -> DerivedResult {
    let family = ObjectiveFamily::classify(objective);

    if family == ObjectiveFamily::Awareness {
        let count = reach.max(0) as f64;
        return DerivedResult {
            count,
            label: REACH_LABEL,
            action_type: None,
            cost_per_result: round2(safe_div(finite(spend), count)),
        };
    }

    let candidates = &CANDIDATES[&family];
    let chosen = candidates
        .iter()
        .find(|c| action_value(actions, c.action_type).is_some_and(|v| v > 0.0))
        // No candidate matched: show the preferred metric at zero rather
        // than an empty cell.
        .unwrap_or(&candidates[0]);

    let count = action_value(actions, chosen.action_type).unwrap_or(0.0);
    let platform_cost = action_value(cost_per_action, chosen.action_type);
    let cost = match platform_cost {
        Some(c) if c > 0.0 => c,
        _ => safe_div(finite(spend), count),
    };

    DerivedResult {
        count,
        label: chosen.label,
        action_type: Some(chosen.action_type),
        cost_per_result: round2(cost),
    }
}
