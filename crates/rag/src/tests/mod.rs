mod mocks;
mod pipeline_scenarios;
