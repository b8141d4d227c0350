use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::api_connection::connection::ApiConnectionError;
use crate::api_connection::endpoints::{
    ChatCompletionRequest, ChatMessage, JsonSchema, JsonSchemaDefinition, JsonSchemaProperty,
    Provider, ResponseFormat,
};
use crate::food_log::NutritionRecord;

/// One food the model recognised in the meal.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AnalyzedItem {
    pub name: String,
    pub calories: f64,
    pub protein: f64,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MealAnalysis {
    pub items: Vec<AnalyzedItem>,
}

/// What the user submitted: a description, a photo, or both.
#[derive(Debug, Clone, Default)]
pub struct MealInput {
    pub description: String,
    pub photo: Option<Photo>,
}

#[derive(Debug, Clone)]
pub struct Photo {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl Photo {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// Guesses an image MIME type from a file extension.
pub fn mime_type_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        _ => "image/jpeg",
    }
}

const SYSTEM_PROMPT: &str = concat!(
    "You are a nutrition estimation assistant. Identify each distinct food in the user's meal ",
    "(from the description and, if present, the photo) and estimate its calories (kcal) and ",
    "protein (grams) for the portion shown or described.\n",
    "Return ONLY a JSON object of the form {\"items\": [{\"name\": string, ",
    "\"calories\": number, \"protein\": number, \"note\": string}]}.\n",
    "Use short everyday names (e.g. 'dal', 'chicken rice bowl'). ",
    "Put portion details or assumptions in 'note'. Never return negative numbers."
);

fn item_schema() -> JsonSchema {
    let mut properties = HashMap::new();
    for (field, kind, description) in [
        ("name", "string", "Short everyday name of the food."),
        ("calories", "number", "Estimated energy in kcal for the portion."),
        ("protein", "number", "Estimated protein in grams for the portion."),
        ("note", "string", "Portion size or assumptions made."),
    ] {
        properties.insert(
            field.to_string(),
            JsonSchemaProperty {
                property_type: kind.to_string(),
                description: Some(description.to_string()),
                items: None,
            },
        );
    }
    JsonSchema {
        schema_type: "object".to_string(),
        properties: Some(properties),
        required: Some(
            ["name", "calories", "protein", "note"]
                .iter()
                .map(|f| f.to_string())
                .collect(),
        ),
        additional_properties: Some(false),
    }
}

fn get_meal_analysis_json_schema() -> JsonSchemaDefinition {
    let mut properties = HashMap::new();
    properties.insert(
        "items".to_string(),
        JsonSchemaProperty {
            property_type: "array".to_string(),
            description: Some("Every food recognised in the meal.".to_string()),
            items: Some(Box::new(item_schema())),
        },
    );

    JsonSchemaDefinition {
        name: "meal_analysis_schema".to_string(),
        strict: Some(true),
        schema: JsonSchema {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: Some(vec!["items".to_string()]),
            additional_properties: Some(false),
        },
    }
}

pub fn build_analysis_request(input: &MealInput, model: &str) -> ChatCompletionRequest {
    let description = if input.description.trim().is_empty() {
        "Analyze the meal in this photo.".to_string()
    } else {
        input.description.clone()
    };
    let user_message = match &input.photo {
        Some(photo) => ChatMessage::user_with_image(description, photo.data_url()),
        None => ChatMessage::user(description),
    };

    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![ChatMessage::system(SYSTEM_PROMPT), user_message],
        response_format: Some(ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: Some(get_meal_analysis_json_schema()),
        }),
        temperature: Some(0.1),
        max_tokens: Some(1024),
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    if !(trimmed.starts_with("```") && trimmed.ends_with("```") && trimmed.len() >= 6) {
        return trimmed;
    }
    let inner = &trimmed[3..trimmed.len() - 3];
    inner.strip_prefix("json").unwrap_or(inner).trim()
}

/// Parses the model's reply into validated records dated `occurred_on`.
/// Items with negative or non-finite numbers make the whole reply invalid.
pub fn parse_analysis_content(
    content: &str,
    occurred_on: NaiveDate,
    image_ref: Option<&str>,
) -> Result<Vec<NutritionRecord>, ApiConnectionError> {
    let json = strip_code_fences(content);
    if json.is_empty() {
        return Err(ApiConnectionError::EmptyResponse(
            "content is empty after stripping markdown".to_string(),
        ));
    }

    let analysis: MealAnalysis = serde_json::from_str(json)?;
    analysis
        .items
        .into_iter()
        .map(|item| {
            NutritionRecord::new(item.name, item.calories, item.protein, occurred_on)
                .map(|r| r.with_note(item.note).with_image_ref(image_ref.map(str::to_string)))
                .map_err(ApiConnectionError::from)
        })
        .collect()
}

/// Sends the meal to the analysis model and returns one record per recognised food.
pub async fn analyze_meal(
    provider: &Provider,
    model: &str,
    input: &MealInput,
    occurred_on: NaiveDate,
    image_ref: Option<&str>,
) -> Result<Vec<NutritionRecord>, ApiConnectionError> {
    let request = build_analysis_request(input, model);
    let response = provider.call_chat_completion(request).await?;
    let content = response
        .first_content()
        .ok_or_else(|| ApiConnectionError::EmptyResponse("no choices in response".to_string()))?;
    tracing::debug!(content, "Meal analysis reply");

    let records = parse_analysis_content(content, occurred_on, image_ref)?;
    tracing::info!(items = records.len(), "Analyzed meal");
    Ok(records)
}
