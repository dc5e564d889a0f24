//! Lookup and Core API endpoints.

use super::{LucidClient, DEFAULT_BUNDLES};
use crate::error::ValidationError;
use crate::request::DeferredRequest;
use crate::validate::{require, PathArg};

impl LucidClient {
    /// Bundled lookup definitions. An empty `bundles` uses [`DEFAULT_BUNDLES`].
    pub fn get_global_definitions<I, S>(&self, bundles: I) -> DeferredRequest
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = bundles
            .into_iter()
            .map(|bundle| bundle.as_ref().to_string())
            .collect();
        if names.is_empty() {
            names = DEFAULT_BUNDLES.iter().map(|b| b.to_string()).collect();
        }
        self.request(format!(
            "/Lookup/v1/BasicLookups/BundledLookups/{}",
            names.join(",")
        ))
    }

    pub fn get_suppliers(&self) -> DeferredRequest {
        self.request("/Core/v1/Suppliers/AllWithAccount")
    }

    pub fn get_business_units(&self) -> DeferredRequest {
        self.request("/Core/v1/BusinessUnits/All")
    }

    pub fn get_standard_questions(
        &self,
        country_language_id: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let cl = require("CountryLanguageID", &country_language_id)?;
        Ok(self.request(format!("/Lookup/v1/QuestionLibrary/AllQuestions/{cl}")))
    }

    pub fn get_custom_questions(
        &self,
        country_language_id: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let cl = require("CountryLanguageID", &country_language_id)?;
        Ok(self.request(format!(
            "/Lookup/v1/QuestionLibrary/AllCustomQuestionsByAccount/{cl}"
        )))
    }

    pub fn get_question_text(
        &self,
        country_language_id: impl PathArg,
        question_id: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let cl = require("CountryLanguageID", &country_language_id)?;
        let question = require("QuestionID", &question_id)?;
        Ok(self.request(format!(
            "/Lookup/v1/QuestionLibrary/QuestionById/{cl}/{question}"
        )))
    }

    pub fn get_question_options(
        &self,
        country_language_id: impl PathArg,
        question_id: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let cl = require("CountryLanguageID", &country_language_id)?;
        let question = require("QuestionID", &question_id)?;
        Ok(self.request(format!(
            "/Lookup/v1/QuestionLibrary/AllQuestionOptions/{cl}/{question}"
        )))
    }
}
