//! A known-good starter manifest for a Flask + PyTorch + OpenCV service.

use crate::manifest::Manifest;

pub const BASIC_ML_TEMPLATE: &str = "\
# Basic Flask web framework
flask>=3.0.0
flask-cors>=6.0.0
werkzeug>=3.0.0

# AWS SDK
boto3>=1.35.0
botocore>=1.35.0

# Computer Vision & ML
opencv-python>=4.8.0
numpy>=1.24.0,<2.3.0
pillow>=10.0.0
scipy>=1.11.0
pandas>=2.0.0

# PyTorch (CPU version for faster install)
torch>=2.0.0
torchvision>=0.15.0

# YOLO
ultralytics>=8.0.0

# Utilities
python-dotenv>=1.0.0
gunicorn>=21.0.0
psutil>=5.9.0

# Testing
pytest>=7.0.0
pytest-flask>=1.2.0
";

/// The template as a manifest, without the trailing newline
pub fn template_manifest() -> Manifest {
    Manifest::parse(BASIC_ML_TEMPLATE.trim())
}
