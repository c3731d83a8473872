/// Section labels the personas are instructed to write, matched case-sensitively
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    FinalAnswer,
    TechnicalInsights,
    Recommendations,
    FinancialAnalysis,
    NextSteps,
    PolicyOverview,
    AvailableIncentives,
    Summary,
    PriorityActions,
    SuggestedQuestions,
}

/// Item delimiter inside bullet-list sections
pub const BULLET: char = '•';

impl Marker {
    pub const ALL: [Marker; 10] = [
        Marker::FinalAnswer,
        Marker::TechnicalInsights,
        Marker::Recommendations,
        Marker::FinancialAnalysis,
        Marker::NextSteps,
        Marker::PolicyOverview,
        Marker::AvailableIncentives,
        Marker::Summary,
        Marker::PriorityActions,
        Marker::SuggestedQuestions,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Marker::FinalAnswer => "FINAL ANSWER:",
            Marker::TechnicalInsights => "TECHNICAL INSIGHTS:",
            Marker::Recommendations => "RECOMMENDATIONS:",
            Marker::FinancialAnalysis => "FINANCIAL ANALYSIS:",
            Marker::NextSteps => "NEXT STEPS:",
            Marker::PolicyOverview => "POLICY OVERVIEW:",
            Marker::AvailableIncentives => "AVAILABLE INCENTIVES:",
            Marker::Summary => "SUMMARY:",
            Marker::PriorityActions => "PRIORITY ACTIONS:",
            Marker::SuggestedQuestions => "SUGGESTED QUESTIONS:",
        }
    }
}
