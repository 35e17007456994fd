//! Offline scripted backend
//!
//! Answers from a built-in table of common plant diseases and city weather.
//! Used by demos and tests, and as a fallback when no backend is reachable.

use super::types::{
    DiseaseInfo, LocationInfoResponse, PredictionRequest, PredictionResponse, WeatherInfo,
};
use super::{DiagnosisService, ServiceError};
use async_trait::async_trait;
use rand::seq::SliceRandom;

/// Scripted diagnosis service with no external dependencies
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineService;

impl OfflineService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DiagnosisService for OfflineService {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, ServiceError> {
        if request.is_empty() {
            return Err(ServiceError::invalid_request(
                "Either text or image must be provided",
            ));
        }

        let diseases = scripted_diseases();

        if let Some(text) = &request.text {
            let lowered = text.to_lowercase();
            for (keywords, info) in &diseases {
                if keywords.iter().any(|keyword| lowered.contains(keyword)) {
                    return Ok(PredictionResponse::Diagnosis(info.clone()));
                }
            }
        }

        if request.image.is_some() {
            // Image rounds pick a random scripted disease
            let info = diseases
                .choose(&mut rand::thread_rng())
                .map(|(_, info)| info.clone())
                .unwrap_or_else(unrecognized);
            return Ok(PredictionResponse::Diagnosis(info));
        }

        Ok(PredictionResponse::Diagnosis(unrecognized()))
    }

    async fn fetch_location_info(
        &self,
        location: &str,
    ) -> Result<LocationInfoResponse, ServiceError> {
        let lowered = location.to_lowercase();

        let info = if lowered.contains("hanoi") || lowered.contains("hà nội") {
            WeatherInfo {
                location: "Hà Nội".to_string(),
                temperature: 32.0,
                humidity: 80.0,
                conditions: "Mưa nhẹ".to_string(),
                suitable_for_treatment: true,
                recommendation: "Thời tiết có mưa nhẹ, thích hợp cho các biện pháp xử lý bệnh. Lưu ý đợi lúc tạnh mưa để phun thuốc.".to_string(),
            }
        } else if lowered.contains("ho chi minh")
            || lowered.contains("hồ chí minh")
            || lowered.contains("saigon")
            || lowered.contains("sài gòn")
        {
            WeatherInfo {
                location: "Hồ Chí Minh".to_string(),
                temperature: 34.0,
                humidity: 75.0,
                conditions: "Nắng, có mây".to_string(),
                suitable_for_treatment: true,
                recommendation: "Thời tiết nắng nhẹ, thích hợp cho việc phun thuốc vào buổi sáng sớm hoặc chiều muộn.".to_string(),
            }
        } else if lowered.contains("da nang") || lowered.contains("đà nẵng") {
            WeatherInfo {
                location: "Đà Nẵng".to_string(),
                temperature: 30.0,
                humidity: 85.0,
                conditions: "Mưa dông".to_string(),
                suitable_for_treatment: false,
                recommendation: "Thời tiết hiện tại có mưa dông, không thích hợp cho việc phun thuốc. Nên đợi thời tiết ổn định hơn.".to_string(),
            }
        } else {
            WeatherInfo {
                location: location.to_string(),
                temperature: 29.0,
                humidity: 78.0,
                conditions: "Nhiều mây".to_string(),
                suitable_for_treatment: true,
                recommendation: "Thời tiết ổn định, có thể tiến hành các biện pháp xử lý bệnh.".to_string(),
            }
        };

        Ok(LocationInfoResponse::Weather(info))
    }

    fn backend_name(&self) -> &str {
        "offline"
    }
}

// ============================================================
// Scripted data
// ============================================================

fn entry(name: &str, details: &str, treatment: &str, medications: &[&str]) -> DiseaseInfo {
    DiseaseInfo {
        disease_name: name.to_string(),
        details: details.to_string(),
        treatment: treatment.to_string(),
        medications: medications.iter().map(|m| (*m).to_string()).collect(),
    }
}

fn scripted_diseases() -> Vec<(Vec<&'static str>, DiseaseInfo)> {
    vec![
        (
            vec!["vàng", "yellow"],
            entry(
                "Bệnh vàng lá (Chlorosis)",
                "Bệnh vàng lá thường do thiếu các chất dinh dưỡng như sắt, mangan hoặc kẽm. Lá cây sẽ chuyển sang màu vàng nhưng gân lá vẫn giữ màu xanh.",
                "Bón phân cân đối, phun dung dịch phân bón lá chứa vi lượng, cải thiện độ pH của đất.",
                &[
                    "Phân bón lá chứa sắt",
                    "Phân vi lượng tổng hợp",
                    "Chế phẩm điều chỉnh pH đất",
                ],
            ),
        ),
        (
            vec!["đốm", "spot"],
            entry(
                "Bệnh đốm lá (Leaf spot)",
                "Bệnh đốm lá thường do nấm hoặc vi khuẩn gây ra. Biểu hiện là các đốm màu nâu hoặc đen trên bề mặt lá, có thể lan rộng và làm lá rụng sớm.",
                "Loại bỏ lá bị bệnh, tăng cường thông gió, tưới nước vào gốc thay vì lên lá, sử dụng thuốc trừ nấm.",
                &[
                    "Thuốc trừ nấm có chứa đồng",
                    "Thuốc trừ nấm chứa Mancozeb",
                    "Chế phẩm sinh học Trichoderma",
                ],
            ),
        ),
        (
            vec!["héo", "wilt"],
            entry(
                "Bệnh héo rũ (Fusarium wilt)",
                "Bệnh héo rũ do nấm Fusarium gây ra, tấn công hệ thống mạch dẫn của cây. Cây héo từng phần hoặc toàn bộ, thậm chí khi đất đủ ẩm.",
                "Nhổ bỏ cây bị bệnh, xử lý đất trước khi trồng lại, chọn giống kháng bệnh, luân canh với cây trồng khác họ.",
                &[
                    "Thuốc trừ nấm gốc Carbendazim",
                    "Chế phẩm sinh học Trichoderma",
                    "Thuốc trừ nấm gốc Propiconazole",
                ],
            ),
        ),
        (
            vec!["mốc", "mold"],
            entry(
                "Bệnh mốc xám (Gray mold)",
                "Bệnh mốc xám do nấm Botrytis gây ra, thường phát triển trong điều kiện ẩm ướt. Biểu hiện là lớp mốc xám trên lá, hoa và quả.",
                "Tăng thông gió, giảm độ ẩm, loại bỏ bộ phận bị nhiễm bệnh, phun thuốc trừ nấm phòng ngừa.",
                &[
                    "Thuốc trừ nấm chứa Iprodione",
                    "Thuốc trừ nấm sinh học gốc Bacillus",
                    "Thuốc trừ nấm chứa Thiophanate-methyl",
                ],
            ),
        ),
        (
            vec!["rỉ", "rust"],
            entry(
                "Bệnh rỉ sắt (Rust)",
                "Bệnh rỉ sắt do nấm gây ra với đặc trưng là các đốm màu nâu đỏ hoặc cam trên lá. Bào tử của nấm có thể lan truyền qua không khí.",
                "Loại bỏ lá bị bệnh, tăng cường thông gió, tránh tưới nước lên lá, phun thuốc trừ nấm chuyên dụng.",
                &[
                    "Thuốc trừ nấm chứa Tebuconazole",
                    "Thuốc trừ nấm chứa Azoxystrobin",
                    "Thuốc trừ nấm gốc lưu huỳnh",
                ],
            ),
        ),
    ]
}

fn unrecognized() -> DiseaseInfo {
    entry(
        "Không thể xác định bệnh từ mô tả",
        "Vui lòng cung cấp thêm thông tin hoặc hình ảnh để được chẩn đoán chính xác hơn.",
        "Chưa có khuyến nghị cụ thể.",
        &["Chưa có khuyến nghị thuốc cụ thể"],
    )
}
