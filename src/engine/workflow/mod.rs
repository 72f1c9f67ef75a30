mod workflow;

pub use workflow::OnboardingEngine;
