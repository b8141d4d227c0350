use chrono::NaiveDate;
use dotenv::dotenv;
use meal_insights::api_connection::{
    connection::ApiConnectionError,
    endpoints::{ChatCompletionRequest, ChatMessage, Provider, OPENROUTER_MODELS},
};
use meal_insights::meal_analyzer::{analyze_meal, MealInput};
use std::env;

const TEST_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

fn get_text_test_model() -> String {
    OPENROUTER_MODELS
        .iter()
        .find(|m| m.model_source == "cerebras")
        .map(|m| m.model_name.to_string())
        .expect("No Cerebras model found in OPENROUTER_MODELS for testing")
}

fn setup_test_environment() {
    dotenv().ok();
}

#[tokio::test]
async fn test_missing_api_key_error() {
    setup_test_environment();
    let provider = Provider::openrouter("THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    let request = ChatCompletionRequest {
        model: get_text_test_model(),
        messages: vec![ChatMessage::user("Hello")],
        response_format: None,
        temperature: None,
        max_tokens: None,
    };
    let result = provider.call_chat_completion(request).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
    if let Err(ApiConnectionError::MissingApiKey(key_name)) = result {
        assert_eq!(key_name, "THIS_KEY_SHOULD_NOT_EXIST_IN_ENV_ABXYZ");
    }
}

#[tokio::test]
async fn test_analyze_meal_surfaces_missing_key() {
    let provider = Provider::openrouter("ANOTHER_KEY_THAT_IS_NOT_SET_QWERTY");
    let input = MealInput {
        description: "two boiled eggs".to_string(),
        photo: None,
    };
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let result = analyze_meal(&provider, &get_text_test_model(), &input, date, None).await;
    assert!(matches!(result, Err(ApiConnectionError::MissingApiKey(_))));
}

#[tokio::test]
#[ignore]
async fn test_live_text_meal_analysis() {
    setup_test_environment();
    if env::var(TEST_API_KEY_ENV_VAR).is_err() {
        println!("Skipping test_live_text_meal_analysis: {} not set.", TEST_API_KEY_ENV_VAR);
        return;
    }

    let provider = Provider::openrouter(TEST_API_KEY_ENV_VAR);
    let input = MealInput {
        description: "2 rotis, a bowl of dal and a cup of rice".to_string(),
        photo: None,
    };
    let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
    let result = analyze_meal(&provider, &get_text_test_model(), &input, date, None).await;
    assert!(result.is_ok(), "Analysis failed: {:?}", result.err());

    let records = result.unwrap();
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.calories() > 0.0 && r.occurred_on() == date));
}
